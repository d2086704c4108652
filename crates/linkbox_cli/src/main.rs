//! Command-line entry point over `linkbox_core`.
//!
//! # Responsibility
//! - Load config, start logging and open the configured record store.
//! - Map each subcommand onto one `NoteService` use-case.

use chrono::Utc;
use clap::{Parser, Subcommand};
use linkbox_core::db::open_db;
use linkbox_core::config::StoreConfig;
use linkbox_core::{
    default_note_name, describe_last_edited, init_from_config, LinkboxConfig, NoteService,
    RecordStore, SqliteRecordStore, StoreBackend,
};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "linkbox", version, about = "A box of wiki-linked notes")]
struct Cli {
    /// Config file; missing files fall back to defaults.
    #[arg(long, default_value = "linkbox.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save note content and update backlinks.
    Save {
        /// Note name; defaults to today's date.
        name: Option<String>,
        /// Read content from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print a note with references rewritten, plus its links and backlinks.
    Show { name: Option<String> },
    /// List note names by most recent modification.
    Recent,
    /// List note names containing a term.
    Search { term: String },
    /// Print outgoing links and backlinks of a note.
    Links { name: String },
    /// Re-apply a note's links to the backlinks of its targets.
    Resync { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("linkbox: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Store backend that cannot keep notes across one-shot invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EphemeralBackend;

impl Display for EphemeralBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(
            "store backend `memory` keeps nothing between runs; set `[store] backend = \"sqlite\"`",
        )
    }
}

impl Error for EphemeralBackend {}

/// Database file of a persistent store config.
fn database_path(store: &StoreConfig) -> Result<&Path, EphemeralBackend> {
    match store.backend {
        StoreBackend::Sqlite => Ok(Path::new(&store.path)),
        StoreBackend::Memory => Err(EphemeralBackend),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = LinkboxConfig::load_from(&cli.config)?;
    init_from_config(&config.logging)?;

    let conn = open_db(database_path(&config.store)?)?;
    let store = SqliteRecordStore::try_new(&conn)?;
    execute(NoteService::from_config(store, &config.notes), cli.command)
}

fn execute<S: RecordStore>(
    mut service: NoteService<S>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Save { name, file } => {
            let name = name.unwrap_or_else(default_note_name);
            let content = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let outcome = service.save_note(&name, content)?;
            println!(
                "saved {} ({} links, {} backlinks)",
                outcome.note.name,
                outcome.note.links.len(),
                outcome.note.backlinks.len()
            );
            for failure in &outcome.sync.failures {
                eprintln!(
                    "warning: {} on `{}` failed: {}",
                    failure.action, failure.target, failure.error
                );
            }
        }
        Command::Show { name } => {
            let name = name.unwrap_or_else(default_note_name);
            let note = service.open_note(&name)?;
            println!("# {}\n", note.name);
            println!("{}\n", service.render_note(&name)?);
            print_list("Links", note.links.iter());
            print_list("Backlinks", note.backlinks.iter());
            println!("{}", describe_last_edited(note.last_modified, Utc::now()));
        }
        Command::Recent => {
            for name in service.recent_notes()? {
                println!("{name}");
            }
        }
        Command::Search { term } => {
            for name in service.search_notes(&term)? {
                println!("{name}");
            }
        }
        Command::Links { name } => {
            let note = service.open_note(&name)?;
            print_list("Links", note.links.iter());
            print_list("Backlinks", note.backlinks.iter());
        }
        Command::Resync { name } => {
            let report = service.resync_note(&name)?;
            println!("updated {} notes", report.updated.len());
            for failure in &report.failures {
                eprintln!("warning: `{}` failed: {}", failure.target, failure.error);
            }
        }
    }
    Ok(())
}

fn print_list<'a>(title: &str, names: impl ExactSizeIterator<Item = &'a String>) {
    println!("{title} ({})", names.len());
    for name in names {
        println!("  - {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::{database_path, EphemeralBackend};
    use linkbox_core::config::StoreConfig;
    use linkbox_core::StoreBackend;
    use std::path::Path;

    #[test]
    fn memory_backend_is_rejected() {
        let store = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        assert_eq!(database_path(&store), Err(EphemeralBackend));
    }

    #[test]
    fn sqlite_backend_uses_configured_path() {
        let store = StoreConfig {
            backend: StoreBackend::Sqlite,
            path: "notes.sqlite3".to_string(),
        };
        assert_eq!(database_path(&store), Ok(Path::new("notes.sqlite3")));
    }
}
