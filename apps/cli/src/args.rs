use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "agent-usage",
    version,
    about = "Track local usage of AI coding assistants from their session logs"
)]
pub struct Cli {
    /// Directory holding the session store and config file.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of `<data-dir>/config.toml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print single-line JSON.
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync every provider and print the aggregated usage snapshot (default).
    Usage,
    /// List one provider's sessions, newest first.
    Sessions {
        #[arg(value_name = "PROVIDER", help = "claude, codex or gemini")]
        provider: String,
    },
    /// Drop the read cache and resync every provider.
    Refresh,
    /// Clear stored sessions and re-ingest everything. Settings are kept.
    Rebuild,
    /// Print store statistics.
    Stats,
    /// Read or write a persisted setting.
    Setting {
        #[command(subcommand)]
        command: SettingCommand,
    },
    /// Parse a single log file without touching the store.
    Parse {
        #[arg(value_name = "PROVIDER")]
        provider: String,
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingCommand {
    Get {
        key: String,
        #[arg(long, default_value = "")]
        default: String,
    },
    Set {
        key: String,
        value: String,
    },
}
