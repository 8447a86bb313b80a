//! AmlWatch CLI - Main entry point

use std::path::PathBuf;

use amlwatch_cli::commands;
use amlwatch_core::Account;
use amlwatch_store::SqliteStore;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "amlwatch")]
#[command(about = "AmlWatch - transaction screening and case management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a rule file
    Rules {
        /// Rule file (JSON array)
        file: PathBuf,
    },

    /// Register account reference data
    Account {
        #[arg(long)]
        db: PathBuf,
        /// Account ID
        #[arg(long)]
        id: String,
        /// Holder name
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: String,
    },

    /// Validate, store and screen a transaction
    Screen {
        /// Rule file
        #[arg(long)]
        rules: PathBuf,
        /// Database file
        #[arg(long)]
        db: PathBuf,
        /// Transaction JSON file
        #[arg(long)]
        tx: PathBuf,
        /// Detection config JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Move an alert to a new status
    Transition {
        #[arg(long)]
        db: PathBuf,
        /// Alert ID
        #[arg(long)]
        alert: String,
        /// Target status (INVESTIGATING, ESCALATED, CLOSED, FALSE_POSITIVE)
        #[arg(long)]
        to: String,
        /// Investigator to assign
        #[arg(long)]
        investigator: Option<String>,
    },

    /// Aggregate alerts into a SAR and export it
    Sar {
        #[arg(long)]
        db: PathBuf,
        /// Alert IDs to include
        #[arg(long = "alert", required = true, num_args = 1..)]
        alerts: Vec<String>,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rules { file } => {
            commands::rules(&file)?;
        }
        Commands::Account {
            db,
            id,
            name,
            address,
            dob,
        } => {
            let store = SqliteStore::open(&db)?;
            commands::account(&store, Account::new(id, name, address, dob))?;
        }
        Commands::Screen {
            rules,
            db,
            tx,
            config,
        } => {
            let store = SqliteStore::open(&db)?;
            commands::screen(&store, &rules, &tx, config.as_deref())?;
        }
        Commands::Transition {
            db,
            alert,
            to,
            investigator,
        } => {
            let store = SqliteStore::open(&db)?;
            commands::transition(&store, &alert, &to, investigator.as_deref())?;
        }
        Commands::Sar { db, alerts, out } => {
            let store = SqliteStore::open(&db)?;
            commands::sar(&store, &alerts, &out)?;
        }
    }

    Ok(())
}
