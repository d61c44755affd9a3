//! List every document transitively imported by a root document.

use anyhow::{Result, anyhow};
use clap::Args;
use std::path::PathBuf;

use super::common::AnalyzeArgs;

/// Command to list transitive imports in breadth-first order.
#[derive(Args, Debug)]
pub struct DepsCommand {
    #[command(flatten)]
    analyze: AnalyzeArgs,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    format: String,
}

impl DepsCommand {
    /// Execute the deps command.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        if !matches!(self.format.as_str(), "text" | "json") {
            return Err(anyhow!("Invalid format '{}'. Valid formats are: text, json", self.format));
        }

        let analyzer = self.analyze.analyzer(config_path.as_deref()).await?;
        let dependencies = analyzer.dependencies().await?;

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&dependencies)?);
        } else {
            for href in &dependencies {
                println!("{href}");
            }
        }
        Ok(())
    }
}
