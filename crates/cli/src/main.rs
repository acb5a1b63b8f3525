//! Altitude CLI — the main entry point.
//!
//! Commands:
//! - `refine`    — Refine an idea one layer further
//! - `prune`     — Drop branches that no longer fit a new direction
//! - `export`    — Print the idea and its tree or history as JSON
//! - `templates` — List templates or show one
//! - `onboard`   — Initialize config and template directory

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod session;

#[derive(Parser)]
#[command(
    name = "altitude",
    about = "Altitude — refine a vague idea into an actionable plan",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Refine an idea toward the next layer
    Refine {
        /// The idea text
        text: String,

        /// Template to refine with (defaults to the session's or the configured one)
        #[arg(short, long)]
        template: Option<String>,

        /// Session file holding the tree or history between calls
        #[arg(short, long, env = "ALTITUDE_SESSION")]
        session: Option<PathBuf>,

        /// Skip straight to the output layer
        #[arg(long)]
        yolo: bool,

        /// Answer to a previous question (repeatable)
        #[arg(short, long = "response")]
        responses: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prune the session's tree against a new direction
    Prune {
        /// The new direction
        direction: String,

        #[arg(short, long, env = "ALTITUDE_SESSION")]
        session: PathBuf,

        /// Report what would be kept without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the session's idea and its tree or history
    Export {
        #[arg(short, long, env = "ALTITUDE_SESSION")]
        session: PathBuf,
    },

    /// List templates, or show the layers of one
    Templates {
        name: Option<String>,
    },

    /// Initialize configuration and template directory
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Refine {
            text,
            template,
            session,
            yolo,
            responses,
            json,
        } => {
            commands::refine::run(commands::refine::RefineArgs {
                text,
                template,
                session,
                yolo,
                responses,
                json,
            })
            .await?
        }
        Commands::Prune {
            direction,
            session,
            dry_run,
        } => commands::prune::run(&direction, &session, dry_run).await?,
        Commands::Export { session } => commands::export::run(&session).await?,
        Commands::Templates { name } => commands::templates::run(name.as_deref()).await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
