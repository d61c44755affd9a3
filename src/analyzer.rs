//! The public entry point: analyze a root document and everything it imports.

use std::sync::Arc;

use crate::core::MetatreeError;
use crate::loader::Loader;
use crate::markup::{DocumentParser, HtmlScanner};
use crate::models::MetadataTreeNode;
use crate::resolver::{DocumentNode, DocumentResolver};
use crate::script::{RegistrationScanner, ScriptParser};
use crate::tree::MetadataTreeBuilder;

/// Analysis of one root document.
///
/// Construction parses the root synchronously and, inside a tokio runtime,
/// starts extracting its scripts and fetching its imports in the background.
/// [`metadata_tree`](Self::metadata_tree) and
/// [`dependencies`](Self::dependencies) await that work. Results are memoized
/// for the lifetime of the analyzer, so repeated calls never refetch.
///
/// # Examples
///
/// ```rust,no_run
/// use metatree::analyzer::Analyzer;
/// use metatree::loader::{FsLoader, Loader};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let text = tokio::fs::read_to_string("site/index.html").await?;
/// let loader: Arc<dyn Loader> = Arc::new(FsLoader::new("site"));
/// let analyzer = Analyzer::new(&text, false, "index.html", Some(loader))?;
///
/// let tree = analyzer.metadata_tree().await?;
/// println!("{} elements", tree.element_count());
/// # Ok(())
/// # }
/// ```
pub struct Analyzer {
    resolver: DocumentResolver,
    root: Arc<DocumentNode>,
}

impl Analyzer {
    /// Start analyzing `root_text`, the document at `root_href`.
    ///
    /// With `attach`, every element and module record carries its script body.
    /// Without a loader, imports are not followed.
    pub fn new(
        root_text: &str,
        attach: bool,
        root_href: &str,
        loader: Option<Arc<dyn Loader>>,
    ) -> Result<Self, MetatreeError> {
        Self::builder().attach_scripts(attach).loader_opt(loader).build(root_href, root_text)
    }

    /// Configure parsers and the loader before starting.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// Build the merged metadata tree.
    pub async fn metadata_tree(&self) -> Result<MetadataTreeNode, MetatreeError> {
        MetadataTreeBuilder::new(&self.resolver).build(&self.root).await
    }

    /// Every address transitively imported by the root, breadth-first.
    pub async fn dependencies(&self) -> Result<Vec<String>, MetatreeError> {
        self.resolver.dependencies(self.root.href()).await
    }

    /// Addresses resolved so far, sorted.
    pub fn documents(&self) -> Vec<String> {
        self.resolver.documents()
    }

    /// Address of the root document.
    pub fn root_href(&self) -> &str {
        self.root.href()
    }

    /// The resolved root document.
    pub fn root(&self) -> &Arc<DocumentNode> {
        &self.root
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &DocumentResolver {
        &self.resolver
    }
}

/// Builder for [`Analyzer`].
pub struct AnalyzerBuilder {
    markup: Arc<dyn DocumentParser>,
    scripts: Arc<dyn ScriptParser>,
    loader: Option<Arc<dyn Loader>>,
    attach: bool,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self {
            markup: Arc::new(HtmlScanner::new()),
            scripts: Arc::new(RegistrationScanner::new()),
            loader: None,
            attach: false,
        }
    }
}

impl AnalyzerBuilder {
    /// Replace the markup parser.
    #[must_use]
    pub fn document_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.markup = Arc::new(parser);
        self
    }

    /// Replace the script parser.
    #[must_use]
    pub fn script_parser(mut self, parser: impl ScriptParser + 'static) -> Self {
        self.scripts = Arc::new(parser);
        self
    }

    /// Follow imports and external scripts through `loader`.
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set or clear the loader.
    #[must_use]
    pub fn loader_opt(mut self, loader: Option<Arc<dyn Loader>>) -> Self {
        self.loader = loader;
        self
    }

    /// Attach script bodies to extracted records.
    #[must_use]
    pub fn attach_scripts(mut self, attach: bool) -> Self {
        self.attach = attach;
        self
    }

    /// Parse and register the root document.
    pub fn build(self, root_href: &str, root_text: &str) -> Result<Analyzer, MetatreeError> {
        let resolver = DocumentResolver::new(self.markup, self.scripts, self.loader, self.attach);
        let root = resolver.resolve(root_href, root_text)?;
        Ok(Analyzer {
            resolver,
            root,
        })
    }
}
