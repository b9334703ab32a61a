//! Logger setup for the playground binary.
//!
//! Terminal output goes to stderr so program output on stdout stays clean.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use super::cli::LogTarget;

/// Map `-v` occurrences to a level: warn by default, then info, then debug.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Install the global logger. Calling it twice leaves the first logger in place.
pub fn initialize(target: LogTarget, level: LevelFilter, log_file: &Path) {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if matches!(target, LogTarget::Terminal | LogTarget::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if matches!(target, LogTarget::File | LogTarget::Both) {
        match File::create(log_file) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("Warning: could not create log file {:?}: {}", log_file, err),
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("playground")
        .build()
}
