#[cfg(feature = "std")]
/// Searches all ancestor directories of the current working directory
/// (including itself) for a file or directory with the given name.
/// If found, returns the path to the file or directory.
pub fn search_current_ancestor_dirs_for(name: &str) -> Option<std::path::PathBuf> {
    [
        std::env::current_dir().as_ref(),
        std::env::current_exe().as_ref(),
    ]
    .iter()
    .filter_map(|p| p.ok())
    .flat_map(|p| p.ancestors())
    .find(|p| {
        p.read_dir().is_ok_and(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_str().is_some_and(|n| n.starts_with(name)))
        })
    })
    .map(|p| p.join(name))
}

#[cfg(feature = "serde_json")]
pub mod serde {
    /// Compact JSON with every top-level value on its own line.
    #[derive(Default)]
    pub struct JsonLinesFormatter {
        depth: usize,
    }

    use serde_json::ser::{CompactFormatter, Formatter as JsonFormatter};

    impl JsonFormatter for JsonLinesFormatter {
        fn begin_object<W>(&mut self, writer: &mut W) -> std::io::Result<()>
        where
            W: ?Sized + std::io::Write,
        {
            self.depth += 1;
            CompactFormatter.begin_object(writer)
        }

        fn end_object<W>(&mut self, writer: &mut W) -> std::io::Result<()>
        where
            W: ?Sized + std::io::Write,
        {
            self.depth -= 1;
            CompactFormatter.end_object(writer).and_then(|_| {
                if self.depth == 0 {
                    writer.write_all(b"\n")
                } else {
                    Ok(())
                }
            })
        }
    }
}

#[cfg(all(test, feature = "serde_json"))]
mod tests {
    use serde::Serialize;

    use super::serde::JsonLinesFormatter;

    #[test]
    fn json_lines_puts_each_value_on_its_own_line() {
        let mut out = std::vec::Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, JsonLinesFormatter::default());
        serde_json::json!({"a": {"b": 1}}).serialize(&mut serializer).unwrap();
        serde_json::json!({"c": [2]}).serialize(&mut serializer).unwrap();
        assert_eq!(
            std::str::from_utf8(&out).unwrap(),
            "{\"a\":{\"b\":1}}\n{\"c\":[2]}\n"
        );
    }
}
