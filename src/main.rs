// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! deploysynth - Deployment Definition Synthesizer
//!
//! Render deployment groups and pipeline actions into template documents.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deploysynth::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so rendered templates stay clean on stdout
    let default_filter = if cli.verbose {
        "deploysynth=debug"
    } else {
        "deploysynth=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { name, force } => deploysynth::cli::init::run(name, force, cli.verbose).await,
        Commands::Validate { definition } => {
            deploysynth::cli::validate::run(definition, cli.verbose).await
        }
        Commands::Synth {
            definition,
            format,
            output,
        } => deploysynth::cli::synth::run(definition, format, output, cli.verbose).await,
        Commands::Tags { definition } => deploysynth::cli::tags::run(definition, cli.verbose).await,
    }
}
