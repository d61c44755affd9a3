//! Command-line interface for metatree.
//!
//! # Available Commands
//!
//! - `tree` - Show the merged metadata tree of a document and its imports
//! - `deps` - List every document a root document transitively imports
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - Errors only
//! - `--config` / `-c` - Use this config file instead of `metatree.toml`
//!   next to the document
//!
//! `RUST_LOG` takes precedence over both verbosity flags.
//!
//! ```bash
//! metatree tree index.html
//! metatree --verbose tree index.html --format json
//! metatree deps index.html --no-imports
//! ```

mod common;
mod deps;
mod tree;

pub use common::AnalyzeArgs;
pub use deps::DepsCommand;
pub use tree::TreeCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Main CLI application structure for metatree.
#[derive(Parser)]
#[command(
    name = "metatree",
    about = "Resolve HTML imports into a merged tree of element and module metadata",
    version,
    long_about = "metatree follows a document's HTML imports, extracts element registrations and module \
                  definitions from every script, and prints the merged tree."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    ///
    /// Defaults to `metatree.toml` in the root document's directory, if present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the merged metadata tree
    Tree(TreeCommand),
    /// List transitive imports in breadth-first order
    Deps(DepsCommand),
}

impl Cli {
    /// Install logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Tree(cmd) => cmd.execute(self.config).await,
            Commands::Deps(cmd) => cmd.execute(self.config).await,
        }
    }

    /// Log level implied by the verbosity flags.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level())
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
