//! Dosage Converter CLI
//!
//! Command-line front end for the dosage store:
//! - One-shot calculations
//! - Edit the saved inputs and commit results to history
//! - List, delete, clear and export history

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dosage_converter::{
    compute_result, export_document, format_dose, generate_default_config, init_logging,
    is_acceptable_input, Config, DosageStore, ExportFormat, Field, FileStore, HistoryEntry,
    InputState,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dosage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scale a label dilution ratio to your tank size")]
#[command(long_about = "Dosage Converter computes how much concentrate to add for a target volume,\ngiven the amount-per-volume ratio printed on the product label.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a dosage without touching saved state
    Calc {
        /// Label amount of concentrate (cc)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Label carrier volume (L)
        #[arg(allow_hyphen_values = true)]
        volume: String,
        /// Volume to treat (L)
        #[arg(allow_hyphen_values = true)]
        target: String,
    },

    /// Update the saved inputs
    Set {
        /// Label amount of concentrate (cc); pass "" to clear
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Label carrier volume (L); pass "" to clear
        #[arg(short, long, allow_hyphen_values = true)]
        volume: Option<String>,
        /// Volume to treat (L); pass "" to clear
        #[arg(short, long, allow_hyphen_values = true)]
        target: Option<String>,
    },

    /// Show the saved inputs and result
    Show,

    /// Save the current result to history
    Save,

    /// List saved calculations (newest first)
    History,

    /// Delete one history entry
    Delete {
        /// Entry id (see `dosage history`)
        id: String,
    },

    /// Delete all history entries
    Clear,

    /// Export history
    Export {
        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match cli.command {
        Commands::Calc {
            amount,
            volume,
            target,
        } => {
            for (field, value) in [
                (Field::StandardAmount, &amount),
                (Field::StandardVolume, &volume),
                (Field::TargetVolume, &target),
            ] {
                check_input(field, value)?;
            }

            match compute_result(&InputState::new(amount, volume, target)) {
                Some(result) => println!("{} cc", format_dose(result)),
                None => bail!("No result: all three values must be numbers and the label volume must not be zero"),
            }
        }

        Commands::Set {
            amount,
            volume,
            target,
        } => {
            let edits: Vec<(Field, String)> = [
                (Field::StandardAmount, amount),
                (Field::StandardVolume, volume),
                (Field::TargetVolume, target),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();

            if edits.is_empty() {
                bail!("Nothing to set. Use --amount, --volume and/or --target");
            }

            // Validate everything before the first write
            for (field, value) in &edits {
                check_input(*field, value)?;
            }

            let mut store = open_store(&config);
            for (field, value) in edits {
                store.set_field(field, value);
            }
            print_current(&store);
        }

        Commands::Show => {
            let store = open_store(&config);
            print_current(&store);
        }

        Commands::Save => {
            let mut store = open_store(&config);
            match store.add_to_history() {
                Some(entry) => println!("Saved {} cc ({})", format_dose(entry.result), entry.id),
                None => bail!("Nothing to save: the current inputs do not produce a result"),
            }
        }

        Commands::History => {
            let store = open_store(&config);
            print_history(store.history());
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config);
            if store.delete_history_item(&id) {
                println!("Deleted {}", id);
            } else {
                bail!("No history entry with id {}", id);
            }
        }

        Commands::Clear => {
            let mut store = open_store(&config);
            let count = store.history().len();
            store.clear_history();
            println!("Cleared {} entries", count);
        }

        Commands::Export { format, output } => {
            let format: ExportFormat = format.parse()?;
            let store = open_store(&config);
            let data = export_document(&store.document(), format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Exported {} entries to {:?}", store.history().len(), path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> DosageStore<FileStore> {
    let slot = FileStore::from_config(&config.storage);
    tracing::debug!("Using document {:?}", slot.path());
    DosageStore::open(slot)
}

fn check_input(field: Field, value: &str) -> anyhow::Result<()> {
    if !is_acceptable_input(value) {
        bail!("Invalid {}: {:?} (expected a non-negative number)", field, value);
    }
    Ok(())
}

fn print_current(store: &DosageStore<FileStore>) {
    let values = store.values();

    println!("Label amount:  {} cc", or_dash(&values.standard_amount));
    println!("Label volume:  {} L", or_dash(&values.standard_volume));
    println!("Target volume: {} L", or_dash(&values.target_volume));
    println!();

    match store.result() {
        Some(result) => println!("Dosage: {} cc", format_dose(result)),
        None => println!("Dosage: -"),
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn print_history(history: &[HistoryEntry]) {
    if history.is_empty() {
        println!("No saved calculations yet.");
        println!();
        println!("Save one with:");
        println!("  dosage set --amount 200 --volume 200 --target 10");
        println!("  dosage save");
        return;
    }

    println!(
        "{:<10} {:<22} {:<10} {:>10}  {}",
        "Time", "Label", "Target", "Dosage", "ID"
    );
    println!("{}", "-".repeat(92));

    for entry in history {
        let time = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|dt| dt.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let label = format!("{}cc / {}L", entry.standard_amount, entry.standard_volume);
        let target = format!("{}L", entry.target_volume);

        println!(
            "{:<10} {:<22} {:<10} {:>10}  {}",
            time,
            label,
            target,
            format_dose(entry.result),
            entry.id
        );
    }
}
