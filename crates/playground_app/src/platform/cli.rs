use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "playground", version, about = "Run code on a playground server")]
pub struct Cli {
    /// Configuration file (defaults to ./playground.ron when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Execution server base url, overriding the configuration.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log file used by `--log file` and `--log both`.
    #[arg(long, global = true, default_value = "playground.log")]
    pub log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a source file and stream its output until the job ends.
    Run {
        file: PathBuf,
        /// Also write the output pane as an HTML page.
        #[arg(long)]
        html: Option<PathBuf>,
        /// Delay between poll requests in milliseconds.
        #[arg(long)]
        poll_ms: Option<u64>,
    },
    /// Save a source file the way the editor's save command does.
    Save {
        file: PathBuf,
        /// Directory receiving the file.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the address of an example program on the server.
    Example { name: String },
    /// Write a configuration file holding the current settings.
    InitConfig {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
