//! mongogrid — manifest generation for MongoDB service instances.
//!
//! # Usage
//!
//! ```text
//! mongogrid generate-manifest --deployment deployment.json --plan plan.toml \
//!     --request-params request.json --previous-manifest manifest.json
//! ```
//!
//! The manifest is printed to stdout as JSON. Logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mongogrid",
    about = "MongoGrid — MongoDB deployment manifest generator",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deployment manifest and replace the instance's Ops Manager group.
    GenerateManifest {
        /// Service deployment (name, stemcell, releases) as JSON.
        #[arg(long)]
        deployment: PathBuf,
        /// Plan definition as JSON or TOML.
        #[arg(long)]
        plan: PathBuf,
        /// Broker request carrying the caller's `parameters`, as JSON.
        #[arg(long)]
        request_params: Option<PathBuf>,
        /// Previously generated manifest, as JSON.
        #[arg(long)]
        previous_manifest: Option<PathBuf>,
        /// Timeout for each Ops Manager request, in seconds.
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },
    /// Print the instance counts a plan resolves to. Makes no external calls.
    Topology {
        /// Plan definition as JSON or TOML.
        #[arg(long)]
        plan: PathBuf,
        /// Broker request carrying the caller's `parameters`, as JSON.
        #[arg(long)]
        request_params: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mongogrid=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateManifest {
            deployment,
            plan,
            request_params,
            previous_manifest,
            timeout_secs,
        } => commands::generate::generate_manifest(&commands::generate::GenerateArgs {
            deployment,
            plan,
            request_params,
            previous_manifest,
            timeout_secs,
        }),
        Commands::Topology {
            plan,
            request_params,
        } => commands::topology::show(&plan, request_params.as_deref()),
    }
}
