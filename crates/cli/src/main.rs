//! TetriBASS CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session table)
//! tetribass-cli migrate
//!
//! # Show a player's profile and recent scores
//! tetribass-cli player show -e player@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands {
    pub mod migrate;
    pub mod player;
}

#[derive(Parser)]
#[command(name = "tetribass-cli")]
#[command(author, version, about = "TetriBASS CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect players
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Show a player's profile and recent scores
    Show {
        /// Player email address
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Player { action } => match action {
            PlayerAction::Show { email } => commands::player::show(&email).await?,
        },
    }
    Ok(())
}
