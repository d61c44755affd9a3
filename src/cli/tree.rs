//! Display the merged metadata tree of a document.
//!
//! This module provides the `tree` command, which analyzes a root document and
//! prints its import structure in a hierarchical format similar to
//! `cargo tree`, together with the elements and modules each document declares.
//!
//! # Examples
//!
//! Display the full tree:
//! ```bash
//! metatree tree index.html
//! ```
//!
//! Limit tree depth:
//! ```bash
//! metatree tree index.html --depth 1
//! ```
//!
//! Output as JSON:
//! ```bash
//! metatree tree index.html --format json
//! ```
//!
//! # Output Format
//!
//! ## Tree Format (Default)
//! ```text
//! index.html [x-app]
//! ├── elements/x-button.html [x-button]
//! │   └── shared/util.html {util}
//! └── elements/x-card.html [x-card]
//!     └── shared/util.html (*)
//!
//! (*) = already visited (see above)
//! ```
//!
//! Element names are shown in brackets, module names in braces.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::AnalyzeArgs;
use crate::models::{MetadataTreeNode, TreeImport};

/// Command to display the metadata tree.
#[derive(Args, Debug)]
pub struct TreeCommand {
    #[command(flatten)]
    analyze: AnalyzeArgs,

    /// Maximum depth to display (unlimited if not specified)
    ///
    /// # Examples
    ///
    /// ```bash
    /// metatree tree index.html --depth 1    # Only direct imports
    /// ```
    #[arg(short = 'd', long)]
    depth: Option<usize>,

    /// Output format (tree, json, text)
    ///
    /// - `tree`: Hierarchical tree with box-drawing characters (default)
    /// - `json`: The full metadata tree as JSON, placeholders as `{}`
    /// - `text`: Simple indented text format
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,
}

impl TreeCommand {
    /// Execute the tree command.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        self.validate_arguments()?;

        let analyzer = self.analyze.analyzer(config_path.as_deref()).await?;
        let mut tree = analyzer.metadata_tree().await?;
        if let Some(depth) = self.depth {
            limit_depth(&mut tree, depth);
        }

        let output = match self.format.as_str() {
            "json" => serde_json::to_string_pretty(&tree)?,
            "text" => render_text(&tree),
            _ => render_tree(&tree),
        };
        println!("{}", output.trim_end());
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "tree" | "json" | "text" => {}
            _ => {
                return Err(anyhow!("Invalid format '{}'. Valid formats are: tree, json, text", self.format));
            }
        }

        if let Some(depth) = self.depth
            && depth == 0
        {
            return Err(anyhow!("Depth must be at least 1"));
        }

        Ok(())
    }
}

/// Drop imports below `depth` levels under `node`.
fn limit_depth(node: &mut MetadataTreeNode, depth: usize) {
    if depth == 0 {
        node.imports.clear();
        return;
    }
    for import in &mut node.imports {
        if let TreeImport::Expanded(child) = import {
            limit_depth(child, depth - 1);
        }
    }
}

fn render_tree(tree: &MetadataTreeNode) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}{}\n", tree.href.cyan().bold(), summary(tree)));

    for (i, import) in tree.imports.iter().enumerate() {
        print_node(&mut out, import, "", i == tree.imports.len() - 1);
    }

    if has_placeholders(tree) {
        out.push('\n');
        out.push_str(&format!("{}\n", "(*) = already visited (see above)".bright_black()));
    }
    out
}

fn print_node(out: &mut String, import: &TreeImport, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };

    let node = match import {
        TreeImport::Placeholder {
            href,
        } => {
            out.push_str(&format!("{prefix}{connector}{}{}\n", href.cyan(), " (*)".bright_black()));
            return;
        }
        TreeImport::Expanded(node) => node,
    };

    out.push_str(&format!("{prefix}{connector}{}{}\n", node.href.cyan(), summary(node)));

    let child_prefix = if is_last { format!("{prefix}    ") } else { format!("{prefix}│   ") };
    for (i, child) in node.imports.iter().enumerate() {
        print_node(out, child, &child_prefix, i == node.imports.len() - 1);
    }
}

/// ` [elements] {modules}` suffix, empty parts omitted.
fn summary(node: &MetadataTreeNode) -> String {
    let mut parts = String::new();
    if !node.elements.is_empty() {
        let names: Vec<_> = node.elements.iter().map(|e| e.is.as_str()).collect();
        parts.push_str(&format!(" [{}]", names.join(", ").green()));
    }
    if !node.modules.is_empty() {
        let names: Vec<_> = node.modules.iter().map(|m| m.is.as_str()).collect();
        parts.push_str(&format!(" {{{}}}", names.join(", ").yellow()));
    }
    parts
}

fn render_text(tree: &MetadataTreeNode) -> String {
    let mut out = String::new();
    print_text_node(&mut out, tree, 0);
    out
}

fn print_text_node(out: &mut String, node: &MetadataTreeNode, indent: usize) {
    let indent_str = "  ".repeat(indent);
    out.push_str(&format!("{indent_str}{}\n", node.href));

    for element in &node.elements {
        let template = if element.template.is_some() { " (template)" } else { "" };
        out.push_str(&format!("{indent_str}  element {} line {}{template}\n", element.is, element.line));
    }
    for module in &node.modules {
        out.push_str(&format!("{indent_str}  module {} line {}\n", module.is, module.line));
    }

    for import in &node.imports {
        match import {
            TreeImport::Expanded(child) => print_text_node(out, child, indent + 1),
            TreeImport::Placeholder {
                href,
            } => {
                out.push_str(&format!("{indent_str}  {href} (*)\n"));
            }
        }
    }
}

fn has_placeholders(node: &MetadataTreeNode) -> bool {
    node.imports.iter().any(|import| match import {
        TreeImport::Placeholder {
            ..
        } => true,
        TreeImport::Expanded(child) => has_placeholders(child),
    })
}
