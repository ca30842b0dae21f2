//! bootprops CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Sources;

#[derive(Parser)]
#[command(name = "bootprops")]
#[command(version)]
#[command(about = "Check and complete YAML configuration files against property metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report unknown properties, type mismatches and syntax errors
    Check {
        #[command(flatten)]
        sources: Sources,

        /// Emit one JSON object per diagnostic instead of annotated source
        #[arg(long)]
        json: bool,

        /// YAML file to check
        input: PathBuf,
    },

    /// List completion proposals at a byte offset
    Complete {
        #[command(flatten)]
        sources: Sources,

        /// Byte offset of the cursor
        #[arg(long)]
        offset: usize,

        /// Emit proposals as JSON lines
        #[arg(long)]
        json: bool,

        /// YAML file to complete in
        input: PathBuf,
    },

    /// Show documentation for the property at a byte offset
    Hover {
        #[command(flatten)]
        sources: Sources,

        /// Byte offset of the cursor
        #[arg(long)]
        offset: usize,

        /// Also list the source locations that declare the property
        #[arg(long)]
        links: bool,

        /// YAML file to inspect
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bootprops=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            sources,
            json,
            input,
        } => commands::check::execute(&sources, &input, json),
        Commands::Complete {
            sources,
            offset,
            json,
            input,
        } => commands::complete::execute(&sources, &input, offset, json),
        Commands::Hover {
            sources,
            offset,
            links,
            input,
        } => commands::hover::execute(&sources, &input, offset, links),
    }
}
