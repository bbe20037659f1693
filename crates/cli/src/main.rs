//! ClipJoint CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cj-cli migrate
//!
//! # Create a staff account
//! cj-cli staff create -e boss@clipjoint.example -n "Pat the Boss" -p "long password" -r admin
//!
//! # List staff accounts
//! cj-cli staff list
//!
//! # Change a staff account's role
//! cj-cli staff set-role -e boss@clipjoint.example -r manager
//!
//! # Fill an empty database with demo data
//! cj-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `staff` - Manage staff accounts
//! - `seed` - Seed the database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cj-cli")]
#[command(author, version, about = "ClipJoint CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Seed the database with demo data
    Seed {
        /// Seed even if the database already has catalog rows
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff account
    Create {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`admin`, `manager`, `viewer`)
        #[arg(short, long, default_value = "viewer")]
        role: String,
    },
    /// List staff accounts
    List,
    /// Change an account's role
    SetRole {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// New role (`admin`, `manager`, `viewer`)
        #[arg(short, long)]
        role: String,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create {
                email,
                name,
                password,
                role,
            } => {
                commands::staff::create(&email, &name, &password, &role).await?;
            }
            StaffAction::List => commands::staff::list().await?,
            StaffAction::SetRole { email, role } => {
                commands::staff::set_role(&email, &role).await?;
            }
        },
        Commands::Seed { force } => commands::seed::run(force).await?,
    }
    Ok(())
}
