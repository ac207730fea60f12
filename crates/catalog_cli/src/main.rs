//! Command-line shell over `catalog_core`.
//!
//! # Responsibility
//! - Map subcommands onto entry store operations and print results.
//! - Own user confirmation for deletes; the store never prompts.
//!
//! # Invariants
//! - Holds no catalog state beyond one `EntryStore` per invocation.
//! - Entries are addressed by their 1-based position in `list` output.

use catalog_core::{
    default_log_level, init_logging, Entry, EntryStore, JsonFileEntryRepository,
    StoreConfig, StoreError, UpdateValidation, DEFAULT_FILE_NAME,
};
use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

type CatalogStore = EntryStore<JsonFileEntryRepository>;

/// Catalog of known plugins backed by a JSON file.
#[derive(Parser, Debug)]
#[command(name = "catalog", version, about, long_about = None)]
struct Cli {
    /// Backing JSON document.
    #[arg(long, env = "CATALOG_FILE", default_value = DEFAULT_FILE_NAME)]
    file: PathBuf,
    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "CATALOG_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
    /// Only check the website prefix on edit (blank fields and duplicate
    /// names are accepted).
    #[arg(long)]
    lenient_update: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every entry.
    List,
    /// Add a new entry.
    Add {
        name: String,
        description: String,
        website: String,
    },
    /// Change fields of the entry at INDEX; omitted fields keep their value.
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Delete the entry at INDEX.
    Delete {
        index: usize,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Print entries containing QUERY in any field, ignoring case.
    Search { query: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = log_level(&cli);
        let log_dir = match std::env::current_dir() {
            Ok(cwd) => cwd.join(log_dir),
            Err(err) => {
                eprintln!("catalog: invalid log dir: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = init_logging(level, &log_dir) {
            eprintln!("catalog: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("catalog: error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn log_level(cli: &Cli) -> &str {
    cli.log_level.as_deref().unwrap_or(default_log_level())
}

fn run(cli: Cli) -> Result<(), String> {
    let config = StoreConfig {
        update_validation: if cli.lenient_update {
            UpdateValidation::WebsiteOnly
        } else {
            UpdateValidation::Strict
        },
    };
    info!(
        "event=cli_start module=cli status=ok file={}",
        cli.file.display()
    );
    let mut store = EntryStore::initialize(JsonFileEntryRepository::new(&cli.file), config)
        .map_err(|err| err.to_string())?;

    match cli.command {
        Commands::List => {
            if store.is_empty() {
                println!("No entries.");
            }
            for (position, entry) in store.entries().iter().enumerate() {
                print_entry(position, entry);
            }
            Ok(())
        }
        Commands::Add {
            name,
            description,
            website,
        } => {
            let result = store.add(&name, &description, &website);
            match settle(&store, result)? {
                Some(entry) => println!("Added `{}`.", entry.name()),
                None => println!("Added `{}` (saved on retry).", name.trim()),
            }
            Ok(())
        }
        Commands::Edit {
            index,
            name,
            description,
            website,
        } => {
            let current = entry_at(&store, index)?.clone();
            let result = store.update(
                current.id(),
                name.as_deref().unwrap_or(current.name()),
                description.as_deref().unwrap_or(current.description()),
                website.as_deref().unwrap_or(current.website()),
            );
            match settle(&store, result)? {
                Some(entry) => println!("Updated `{}`.", entry.name()),
                None => println!("Updated entry {index} (saved on retry)."),
            }
            Ok(())
        }
        Commands::Delete { index, yes } => {
            let (id, name) = {
                let entry = entry_at(&store, index)?;
                (entry.id(), entry.name().to_string())
            };
            if !yes && !confirm(&format!("Are you sure you want to delete `{name}`?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            let result = store.delete(id);
            match settle(&store, result)? {
                Some(None) => println!("Nothing to delete."),
                Some(Some(_)) | None => println!("Deleted `{name}`."),
            }
            Ok(())
        }
        Commands::Search { query } => {
            let mut found = false;
            for (position, entry) in store.search_positions(&query) {
                print_entry(position, entry);
                found = true;
            }
            if !found {
                println!("No results.");
            }
            Ok(())
        }
    }
}

/// Retries the save once when a mutation was applied but not persisted.
///
/// `Ok(None)` means the operation succeeded only after the retry.
fn settle<T>(store: &CatalogStore, result: Result<T, StoreError>) -> Result<Option<T>, String> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_unsaved() => {
            eprintln!("catalog: warning: {err}; retrying");
            store
                .save()
                .map_err(|err| format!("change was not saved: {err}"))?;
            Ok(None)
        }
        Err(err) if err.is_validation() => Err(format!("rejected: {err}")),
        Err(err) => Err(err.to_string()),
    }
}

fn entry_at(store: &CatalogStore, index: usize) -> Result<&Entry, String> {
    index
        .checked_sub(1)
        .and_then(|position| store.entries().get(position))
        .ok_or_else(|| format!("no entry at index {index}; see `catalog list`"))
}

fn confirm(prompt: &str) -> Result<bool, String> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().map_err(|err| err.to_string())?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| err.to_string())?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_entry(position: usize, entry: &Entry) {
    println!("{}. Name: {}", position + 1, entry.name());
    println!("   Description: {}", entry.description());
    println!("   Website: {}", entry.website());
}

#[cfg(test)]
mod tests {
    use super::{entry_at, log_level, settle, Cli, Commands};
    use catalog_core::{
        default_log_level, EntryStore, JsonFileEntryRepository, StoreConfig, StoreError,
    };
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_edit_with_partial_fields() {
        let cli = Cli::try_parse_from([
            "catalog",
            "--file",
            "/tmp/x.json",
            "edit",
            "2",
            "--website",
            "https://new",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                index,
                name,
                description,
                website,
            } => {
                assert_eq!(index, 2);
                assert!(name.is_none());
                assert!(description.is_none());
                assert_eq!(website.as_deref(), Some("https://new"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn log_level_falls_back_to_build_default() {
        let cli = Cli::try_parse_from(["catalog", "--log-dir", "/tmp/logs", "list"]).unwrap();
        assert_eq!(log_level(&cli), default_log_level());

        let cli =
            Cli::try_parse_from(["catalog", "--log-level", "warn", "list"]).unwrap();
        assert_eq!(log_level(&cli), "warn");
    }

    #[test]
    fn entry_at_is_one_based() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileEntryRepository::new(dir.path().join("c.json"));
        let mut store = EntryStore::initialize(repo, StoreConfig::default()).unwrap();
        store.add("A", "d", "https://a").unwrap();

        assert_eq!(entry_at(&store, 1).unwrap().name(), "A");
        assert!(entry_at(&store, 0).is_err());
        assert!(entry_at(&store, 2).is_err());
    }

    #[test]
    fn settle_passes_validation_errors_through() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileEntryRepository::new(dir.path().join("c.json"));
        let store = EntryStore::initialize(repo, StoreConfig::default()).unwrap();

        let result: Result<(), StoreError> = Err(StoreError::DuplicateName("A".to_string()));
        let message = settle(&store, result).unwrap_err();
        assert!(message.starts_with("rejected: "));
        assert!(message.contains("already exists"));
    }
}
