//! Eyeopener CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply the Supabase schema and row-level policies
//! eo-cli migrate supabase
//!
//! # Create the portal session table
//! eo-cli migrate sessions
//!
//! # Both of the above
//! eo-cli migrate all
//!
//! # Grant or revoke the admin console
//! eo-cli admin promote -e travis@example.com
//! eo-cli admin demote -e travis@example.com
//!
//! # Insert one sample reading of every type for a client
//! eo-cli seed -e client@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin` - Change profile roles
//! - `seed` - Seed sample readings

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eo-cli")]
#[command(author, version, about = "Eyeopener CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert sample readings for a client
    Seed {
        /// Client email address
        #[arg(short, long)]
        email: String,

        /// Delete the client's existing readings first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Supabase schema, triggers and row-level policies
    Supabase,
    /// Portal session table
    Sessions,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a user the admin role
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin to the regular user role
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Supabase => commands::migrate::supabase().await?,
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
            MigrateTarget::All => {
                commands::migrate::supabase().await?;
                commands::migrate::sessions().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, eyeopener_core::Role::Admin).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, eyeopener_core::Role::User).await?;
            }
        },
        Commands::Seed { email, clear } => {
            let inserted = commands::seed::sample_readings(&email, clear).await?;
            tracing::info!(inserted, "Seeding complete");
        }
    }
    Ok(())
}
