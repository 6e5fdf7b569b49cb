use common::{log_info, log_warn, utils::serde::JsonLinesFormatter};

use super::InstructionRecord;
use crate::{
    config::OutputConfig,
    utils::{
        file::FileFormat,
        serdes::{GenericError, TextAdapter, TypeSerializer},
    },
};

type SerializerObj = Box<dyn TypeSerializer<InstructionRecord> + Send>;

/// Streams instruction records to a file as they are appended to the trace.
pub(crate) struct RecordDumper {
    serializer: SerializerObj,
}

impl RecordDumper {
    pub(crate) fn dump(&mut self, record: &InstructionRecord) -> Result<(), GenericError> {
        TypeSerializer::serialize(self.serializer.as_mut(), record)
    }
}

pub(crate) fn create_dumper(
    config: Option<&OutputConfig>,
    thread_name: &str,
) -> Option<RecordDumper> {
    let OutputConfig::File(file_config) = config?;
    let (path, file) = match file_config.create("sym_trace_", thread_name) {
        Ok(created) => created,
        Err(e) => {
            log_warn!("Could not create file for symbolic trace dump: {e}");
            return None;
        }
    };
    log_info!("Dumping symbolic trace to {}", path.display());

    let serializer: SerializerObj = match file_config.format {
        FileFormat::JsonLines => Box::new(serde_json::Serializer::with_formatter(
            file,
            JsonLinesFormatter::default(),
        )),
        FileFormat::Text => Box::new(TextAdapter(file)),
    };
    Some(RecordDumper { serializer })
}
