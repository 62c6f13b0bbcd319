//! capstan - relay deployment manifests to a deploy endpoint.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::install::InstallArgs;
use crate::commands::project::ProjectArgs;
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "capstan")]
#[command(about = "Relay deployment manifests to a capstan deploy endpoint")]
#[command(version)]
struct Cli {
    /// Deploy endpoint base URL (overrides configuration)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a manifest to the deploy endpoint
    #[command(visible_alias = "a")]
    Apply {
        /// Manifest file to apply (defaults to `manifest` from configuration)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete the objects a manifest describes
    #[command(visible_alias = "d")]
    Delete {
        /// Manifest file describing what to delete
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Fetch the current state of an object collection
    #[command(visible_alias = "g")]
    Get {
        /// Collection to fetch, e.g. "route" or "service"
        object: String,
    },

    /// Run the capstand server locally in Docker
    #[command(visible_alias = "i")]
    Install {
        /// Server image to run
        #[arg(long, default_value = "capstancloud/capstand:latest")]
        image: String,

        /// Host port to publish the endpoint on
        #[arg(long, default_value_t = 6227)]
        port: u16,
    },

    /// Print the client version
    #[command(visible_alias = "v")]
    Version,

    /// Build the project image, then apply every service manifest
    #[command(visible_alias = "p")]
    Project {
        /// Project manifest file
        #[arg(short, long, default_value = "project.json")]
        file: PathBuf,

        /// Dockerfile the image is built from
        #[arg(long, default_value = "Dockerfile")]
        dockerfile: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result: Result<(), anyhow::Error> = match cli.command {
        Commands::Apply { file } => commands::apply::run(&config, cli.endpoint, file).await,
        Commands::Delete { file } => commands::delete::run(&config, cli.endpoint, file).await,
        Commands::Get { object } => commands::get::run(&config, cli.endpoint, &object).await,
        Commands::Install { image, port } => commands::install::run(InstallArgs { image, port })
            .await
            .map_err(Into::into),
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Project { file, dockerfile } => {
            let args = ProjectArgs {
                file,
                dockerfile,
                endpoint: cli.endpoint,
            };
            commands::project::run(&config, args).await.map_err(Into::into)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
