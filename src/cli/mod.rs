//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the concept exporter using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Concept Exporter - Neo4j concepts to CSV files in S3
#[derive(Parser, Debug)]
#[command(name = "concept-exporter")]
#[command(version, about, long_about = None)]
#[command(author = "Concept Exporter Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "concept-exporter.toml",
        env = "CONCEPT_EXPORTER_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CONCEPT_EXPORTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP export service
    Serve(commands::serve::ServeArgs),

    /// Run one full export in the foreground
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
