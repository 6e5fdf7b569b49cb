use std::{fmt::Display, io::Write};

use serde::{Serialize, Serializer};

pub(crate) type GenericError = Box<dyn core::error::Error>;

type Result = core::result::Result<(), GenericError>;

/// Writes values of one type to an output, one after another.
/// Bound to a single type so that it can be boxed as a trait object.
pub(crate) trait TypeSerializer<T> {
    fn serialize(&mut self, value: &T) -> Result;
}

/// Any serde serializer, e.g., `serde_json::Serializer` with a lines formatter.
impl<T: Serialize, S> TypeSerializer<T> for S
where
    for<'a> &'a mut S: Serializer,
    for<'a> <&'a mut S as Serializer>::Error: 'static,
{
    fn serialize(&mut self, value: &T) -> Result {
        value
            .serialize(self)
            .map(|_| ())
            .map_err(|e: <&mut S as Serializer>::Error| e.into())
    }
}

/// Writes the display form of each value on its own line.
pub(crate) struct TextAdapter<W>(pub W);

impl<T: Display, W: Write> TypeSerializer<T> for TextAdapter<W> {
    fn serialize(&mut self, value: &T) -> Result {
        writeln!(self.0, "{value}").map_err(Into::into)
    }
}
