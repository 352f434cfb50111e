mod commands;

pub use commands::*;

use crate::types::{LogLevel, OutputFormat};
use clap::Parser;

#[derive(Parser)]
#[command(name = "aichemy")]
#[command(about = "Chat with the AiChemy chemistry agent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory [default: $AICHEMY_PATH or ~/.aichemy]
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Agent proxy base URL (overrides config and AICHEMY_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Answer with the offline mock agent instead of the proxy
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
