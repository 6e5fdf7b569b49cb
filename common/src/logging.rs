//! Logging facade shared by the workspace crates.
//! Every macro emits a `tracing` event, so the subscriber installed by the
//! host decides what is kept. Static level filtering applies as usual.

pub use tracing;

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => ($crate::logging::tracing::event!($crate::logging::tracing::Level::ERROR, $($arg)+))
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => ($crate::logging::tracing::event!($crate::logging::tracing::Level::WARN, $($arg)+))
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => ($crate::logging::tracing::event!($crate::logging::tracing::Level::INFO, $($arg)+))
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => ($crate::logging::tracing::event!($crate::logging::tracing::Level::DEBUG, $($arg)+))
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => ($crate::logging::tracing::event!($crate::logging::tracing::Level::TRACE, $($arg)+))
}
