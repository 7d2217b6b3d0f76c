//! # TM - Terminal Task Manager
//!
//! A small task manager with a form-driven terminal UI and a matching CLI.
//!
//! ## Key Features
//!
//! - **Create, edit and delete tasks** through validated forms
//! - **Search** across title, description, status and priority
//! - **Sort** by title, status, priority or due date, toggling direction
//! - **Paging** through long lists with a configurable page size
//! - **Local storage**: one JSON file in `~/.tm/`, rewritten on every change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the UI
//! tm
//!
//! # Add a task from the shell
//! tm add "Renew passport" --desc "Photos first" --due "next fri" --priority high
//!
//! # List the second page of tasks matching "passport", newest due date first
//! tm list --search passport --sort due --desc --page 2
//! ```
//!
//! Saving is best effort: if the store cannot be written the change is kept
//! for the rest of the session and the failure is logged to `~/.tm/tm.log`.

use std::io;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod due;
pub mod error;
pub mod fields;
pub mod form;
pub mod listing;
pub mod repository;
pub mod router;
pub mod store;
pub mod task;
pub mod validation;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{Settings, LOG_FILE};
use repository::TaskRepository;
use store::{FileStore, KeyValueStore, MemoryStore};

/// Send logs to a file in the data directory so the UI's screen stays clean.
fn init_logging(settings: &Settings) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(&settings.data_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

/// Dispatch a parsed command against a loaded repository.
fn run_command<S: KeyValueStore>(
    mut repo: TaskRepository<S>,
    command: Commands,
    settings: &Settings,
) -> error::Result<()> {
    let mut out = io::stdout();
    match command {
        Commands::Completions { shell } => {
            cmd_completions(shell, &mut out);
            Ok(())
        }
        Commands::Ui => tui::run::run_tui(repo, settings.page_size).map_err(error::Error::from),
        Commands::List { search, sort, desc, page } =>
            cmd_list(&repo, &mut out, search, sort, desc, page, settings.page_size),
        Commands::Add { title, desc, due, status, priority } =>
            cmd_add(&mut repo, &mut out, title, desc, due, status, priority),
        Commands::Edit { id, title, desc, due, status, priority } =>
            cmd_edit(&mut repo, &mut out, id, title, desc, due, status, priority),
        Commands::Delete { id } => cmd_delete(&mut repo, &mut out, id),
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli);

    if let Err(e) = settings.ensure_data_dir() {
        eprintln!(
            "Failed to create data directory {}: {}",
            settings.data_dir.display(),
            e
        );
        process::exit(1);
    }
    let guard = init_logging(&settings);
    info!(dir = %settings.data_dir.display(), "starting");

    let command = cli.command.unwrap_or(Commands::Ui);
    let result = if cli.ephemeral {
        run_command(TaskRepository::load(MemoryStore::new()), command, &settings)
    } else {
        run_command(TaskRepository::load(FileStore::new(&settings.data_dir)), command, &settings)
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {e}");
        drop(guard);
        process::exit(1);
    }
}
