pub(crate) mod file;
pub(crate) mod logging;
pub(crate) mod serdes;
