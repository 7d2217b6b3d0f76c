use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal task manager.
/// Tasks are stored as JSON in the data directory (default ~/.tm).
#[derive(Parser, Debug)]
#[command(name = "tm", version, about = "Terminal task manager")]
pub struct Cli {
    /// Directory holding the task store and log file.
    #[arg(long, global = true, env = "TM_DIR")]
    pub dir: Option<PathBuf>,

    /// Tasks shown per page.
    #[arg(long, global = true, env = "TM_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Log filter, e.g. "tm=debug".
    #[arg(long, global = true, env = "TM_LOG")]
    pub log: Option<String>,

    /// Keep tasks in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
