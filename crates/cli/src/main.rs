//! Kubra Market CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! km-cli migrate
//!
//! # Create a dashboard user (password from --password or KM_USER_PASSWORD)
//! km-cli user create -u alice --first-name Alice --email alice@example.com
//!
//! # Print a password hash for manual inserts
//! km-cli hash-password 'correct horse'
//!
//! # Seed sample data into PostgreSQL
//! km-cli seed
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "km-cli")]
#[command(author, version, about = "Kubra Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage dashboard users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Hash a password and print the stored form
    HashPassword {
        /// Password to hash
        password: String,
    },
    /// Seed the database with sample data (idempotent)
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (prefer the environment variable over the flag)
        #[arg(short, long, env = "KM_USER_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                password,
                first_name,
                last_name,
                email,
            } => {
                commands::user::create(commands::user::CreateUser {
                    username,
                    password: SecretString::from(password),
                    first_name,
                    last_name,
                    email,
                })
                .await?;
            }
        },
        Commands::HashPassword { password } => {
            commands::user::hash_password(&SecretString::from(password))?;
        }
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
