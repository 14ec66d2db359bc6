//! CLI command definitions for the `tutoria` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AI programming tutor backend.
#[derive(Parser)]
#[command(name = "tutoria", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, env = "TUTORIA_CONFIG", default_value = "tutoria.toml")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Host to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask the tutor a single question. Nothing is stored.
    Ask {
        /// The question to ask.
        question: String,

        /// Interest tag to personalize examples (repeatable).
        #[arg(long = "interest")]
        interests: Vec<String>,

        /// Custom instruction appended to the tutor persona.
        #[arg(long)]
        persona: Option<String>,
    },
}
