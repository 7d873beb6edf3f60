#![deny(missing_docs)]
//! Shared logging utilities for the viewer workspace.
//!
//! Every crate logs through the `viewer_*` macros below so the backend can be
//! swapped in one place. The binary installs the real logger; tests use
//! [`initialize_for_tests`].

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! viewer_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! viewer_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! viewer_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! viewer_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! viewer_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Level used by [`initialize_for_tests`]: debug in debug builds, info otherwise.
pub fn test_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// Safe to call from every test: if a logger is already installed the call
/// is a no-op.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let _ = CombinedLogger::init(vec![TermLogger::new(
        test_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    )]);
}
