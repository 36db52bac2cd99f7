//! FILENAME: engine/src/logging.rs
// PURPOSE: Category-tagged logging macros on top of the `log` facade.
//
// Every line carries a category ("PIVOT", "IMPORT", ...) which becomes the
// `log` target, so a subscriber can filter per subsystem.

#[doc(hidden)]
pub use log;

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::log::debug!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::log::info!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::log::warn!(target: $cat, $($arg)*)
    };
}

