//! Fiesta CLI - seeding and staff management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the built-in demo catalog
//! fiesta-cli seed
//!
//! # Seed from a YAML file
//! fiesta-cli seed --file ./catalog.yaml
//!
//! # Create a staff member
//! fiesta-cli staff create -e dispatch@example.com -n "Dana Ortiz" -r dispatcher
//! ```
//!
//! Commands talk to Firestore directly through the admin crate's clients, so
//! the same environment variables apply (`FIREBASE_PROJECT_ID`,
//! `FIREBASE_SERVICE_TOKEN`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fiesta-cli")]
#[command(author, version, about = "Fiesta CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed catalog data into Firestore
    Seed {
        /// Path to a seed YAML file; omit for the built-in demo catalog
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff member
    Create {
        /// Staff email address (must match a Firebase Auth account)
        #[arg(short, long)]
        email: String,

        /// Staff display name
        #[arg(short, long)]
        name: String,

        /// Role id to assign (e.g. `manager`, `dispatcher`)
        #[arg(short, long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Staff { action } => match action {
            StaffAction::Create { email, name, role } => {
                commands::staff::create(&email, &name, role.as_deref()).await?;
            }
        },
    }
    Ok(())
}
