//! Leveled convenience macros over a [`Logger`](crate::Logger) handle.
//!
//! Each macro formats its arguments into a single-part message and submits
//! it with the source label `"All"`:
//!
//! ```ignore
//! use fanlog_core::{log_info, log_warning, Logger};
//!
//! let logger = Logger::global();
//! log_info!(logger, "session opened for {}", user);
//! log_warning!(logger, "retrying connect, attempt {}", attempt);
//! ```

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Info, ::std::vec![::std::format!($($arg)*)])
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Warning, ::std::vec![::std::format!($($arg)*)])
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Error, ::std::vec![::std::format!($($arg)*)])
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Fatal, ::std::vec![::std::format!($($arg)*)])
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Debug, ::std::vec![::std::format!($($arg)*)])
    };
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        $logger.submit("All", $crate::LogLevel::Trace, ::std::vec![::std::format!($($arg)*)])
    };
}
