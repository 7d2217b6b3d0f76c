//! Runtime settings resolved from command-line flags and the environment.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::Result;
use crate::listing::DEFAULT_PAGE_SIZE;

/// Log file written inside the data directory.
pub const LOG_FILE: &str = "tm.log";

/// Default log filter when `TM_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "tm=info";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub page_size: usize,
    pub log_filter: String,
}

impl Settings {
    /// Resolve settings from parsed arguments, falling back to `$HOME/.tm`.
    pub fn from_cli(cli: &Cli) -> Self {
        let data_dir = cli.dir.clone().unwrap_or_else(default_data_dir);
        Settings {
            data_dir,
            page_size: cli.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            log_filter: cli
                .log
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".tm")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["tm", "--dir", "/tmp/tasks", "--page-size", "10", "list"]);
        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/tasks"));
        assert_eq!(settings.page_size, 10);
    }

    #[test]
    fn test_page_size_has_floor_of_one() {
        let cli = Cli::parse_from(["tm", "--dir", "/tmp/tasks", "--page-size", "0"]);
        assert_eq!(Settings::from_cli(&cli).page_size, 1);
    }

    #[test]
    fn test_ensure_data_dir_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["tm", "--dir", tmp.path().join("a/b").to_str().unwrap()]);
        let settings = Settings::from_cli(&cli);
        settings.ensure_data_dir().unwrap();
        assert!(settings.data_dir.is_dir());
    }
}
