#![deny(missing_docs)]
//! Shared logging utilities for the tagmark workspace.
//!
//! This crate provides the `tagmark_*` logging macros used across the codebase,
//! the logger setup used by the binary, and a minimal test initializer.
//!
//! Every message is prefixed with the annotation generation active on the
//! current thread so that log lines from successive re-annotation passes can be
//! told apart.

use std::cell::Cell;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

thread_local! {
    /// Annotation generation currently being processed on this thread.
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Records the annotation generation for the current thread.
/// The highlighter calls this whenever its tag-set version changes.
pub fn set_generation(generation: u64) {
    GENERATION.with(|v| v.set(generation));
}

/// Returns the annotation generation recorded for the current thread,
/// or 0 if none has been set.
pub fn current_generation() -> u64 {
    GENERATION.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current generation.
#[macro_export]
macro_rules! tagmark_trace {
    ($($arg:tt)*) => {{
        log::trace!("[gen {}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current generation.
#[macro_export]
macro_rules! tagmark_debug {
    ($($arg:tt)*) => {{
        log::debug!("[gen {}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current generation.
#[macro_export]
macro_rules! tagmark_info {
    ($($arg:tt)*) => {{
        log::info!("[gen {}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current generation.
#[macro_export]
macro_rules! tagmark_warn {
    ($($arg:tt)*) => {{
        log::warn!("[gen {}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current generation.
#[macro_export]
macro_rules! tagmark_error {
    ($($arg:tt)*) => {{
        log::error!("[gen {}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Default log file written by [`LogDestination::File`] and [`LogDestination::Both`].
pub const LOG_FILE: &str = "tagmark.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to `./tagmark.log` in the current directory.
    File,
    /// Write to the terminal.
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initializes the global logger for the given destination and level.
///
/// Falls back to terminal-only output when the log file cannot be created.
/// Calling this more than once is harmless; later calls are ignored.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match create_file_logger(Path::new(LOG_FILE), level, config.clone()) {
            Some(file_logger) => loggers.push(file_logger),
            None if loggers.is_empty() => loggers.push(TermLogger::new(
                level,
                config,
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )),
            None => {}
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
