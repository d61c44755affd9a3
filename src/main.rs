//! metatree CLI entry point
//!
//! Parses arguments, runs the selected command and renders failures with
//! [`user_friendly_error`].
//!
//! - `tree` - Show the merged metadata tree of a document
//! - `deps` - List transitive imports

use anyhow::Result;
use clap::Parser;
use metatree::cli;
use metatree::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
