//! LedgerFlow CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (including the session table)
//! lf-cli migrate
//!
//! # Create a user
//! lf-cli user create -e owner@example.com -f Ada -l Lovelace
//!
//! # Promote an existing user to admin
//! lf-cli user promote -e owner@example.com
//!
//! # Grant a user access to someone else's store
//! lf-cli grant add -s 7c9e1dca-1111-4ce4-8b2a-000000000001 -u clerk@example.com
//!
//! # Seed demo data
//! lf-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user promote` - Manage users
//! - `grant add` - Grant store access
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(author, version, about = "LedgerFlow CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage store access grants
    Grant {
        #[command(subcommand)]
        action: GrantAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: Option<String>,

        /// Last name
        #[arg(short, long)]
        last_name: Option<String>,

        /// Role (`Admin`, `StoreOwner`, `Clerk`)
        #[arg(short, long, default_value = "StoreOwner")]
        role: String,
    },
    /// Promote an existing user to the admin role
    Promote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum GrantAction {
    /// Grant a user access to a store
    Add {
        /// Store ID (UUID)
        #[arg(short, long)]
        store: String,

        /// User email address
        #[arg(short, long)]
        user: String,

        /// Role within the store (`Owner`, `Clerk`)
        #[arg(short, long, default_value = "Clerk")]
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                first_name,
                last_name,
                role,
            } => {
                commands::user::create(&email, first_name.as_deref(), last_name.as_deref(), &role)
                    .await?;
            }
            UserAction::Promote { email } => commands::user::promote(&email).await?,
        },
        Commands::Grant { action } => match action {
            GrantAction::Add { store, user, role } => {
                commands::grant::add(&store, &user, &role).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
