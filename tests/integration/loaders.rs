use anyhow::Result;
use metatree::analyzer::Analyzer;
use metatree::config::AnalyzerConfig;
use metatree::core::MetatreeError;
use metatree::loader::{FsLoader, Loader};
use metatree::test_utils::DocumentFixture;
use reqwest::Url;
use std::sync::Arc;

use crate::common::TestSite;

#[tokio::test]
async fn test_fs_loader_follows_relative_imports() -> Result<()> {
    let site = TestSite::new()?;
    site.write(
        "elements/x-button.html",
        &DocumentFixture::new().template("x-button").element("x-button").import("../shared/util.html").build(),
    )?;
    site.write("shared/util.html", &DocumentFixture::new().module("util").build())?;
    let root = DocumentFixture::new().import("elements/x-button.html").build();

    let loader: Arc<dyn Loader> = Arc::new(FsLoader::new(site.root()));
    let analyzer = Analyzer::new(&root, false, "index.html", Some(loader))?;
    let tree = analyzer.metadata_tree().await?;

    let button = tree.children().next().expect("x-button.html is expanded");
    assert_eq!(button.href, "elements/x-button.html");
    assert_eq!(button.elements[0].template, Some(0));
    let util = button.children().next().expect("util.html is expanded");
    assert_eq!(util.href, "shared/util.html");
    assert_eq!(util.modules[0].is, "util");
    Ok(())
}

#[tokio::test]
async fn test_file_url_root() -> Result<()> {
    let site = TestSite::new()?;
    site.write("a.html", &DocumentFixture::new().element("x-a").build())?;
    let root_url = Url::from_file_path(site.path("index.html")).expect("absolute path");

    let loader: Arc<dyn Loader> = Arc::new(FsLoader::new(site.root()));
    let analyzer = Analyzer::new(&DocumentFixture::new().import("a.html").build(), false, root_url.as_str(), Some(loader))?;

    let deps = analyzer.dependencies().await?;
    assert_eq!(deps.len(), 1);
    assert!(deps[0].starts_with("file://"));
    assert!(deps[0].ends_with("/site/a.html"));

    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.element_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_import_escaping_root_is_a_loader_error() -> Result<()> {
    let site = TestSite::new()?;
    let loader: Arc<dyn Loader> = Arc::new(FsLoader::new(site.root()));
    let analyzer = Analyzer::new(&DocumentFixture::new().import("../outside.html").build(), false, "index.html", Some(loader))?;

    let err = analyzer.metadata_tree().await.unwrap_err();
    match err {
        MetatreeError::Loader {
            href,
            source,
        } => {
            assert_eq!(href, "../outside.html");
            assert!(source.to_string().contains("escapes"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_config_disables_imports() -> Result<()> {
    let site = TestSite::new()?;
    site.write("metatree.toml", "follow_imports = false\nattach_scripts = true\n")?;

    let config = AnalyzerConfig::load_with_optional(None, site.root()).await?;
    assert!(config.loader(site.root()).is_none());

    let root = DocumentFixture::new().import("missing.html").element("x-root").build();
    let analyzer = Analyzer::new(&root, config.attach_scripts, "index.html", config.loader(site.root()))?;
    let tree = analyzer.metadata_tree().await?;

    assert!(tree.imports.is_empty());
    assert!(tree.elements[0].script.is_some());
    Ok(())
}

#[tokio::test]
async fn test_remote_import_refused_by_default() -> Result<()> {
    let site = TestSite::new()?;
    let config = AnalyzerConfig::default();
    let root = DocumentFixture::new().import("https://example.com/remote.html").build();

    let analyzer = Analyzer::new(&root, false, "index.html", config.loader(site.root()))?;
    let err = analyzer.metadata_tree().await.unwrap_err();
    assert!(err.to_string().contains("allow_remote"));
    Ok(())
}

#[tokio::test]
async fn test_site_root_relative_import() -> Result<()> {
    let site = TestSite::new()?;
    site.write("components/x-nav.html", &DocumentFixture::new().import("/shared/util.html").element("x-nav").build())?;
    site.write("shared/util.html", &DocumentFixture::new().module("util").build())?;
    let root = DocumentFixture::new().import("/components/x-nav.html").build();

    let loader: Arc<dyn Loader> = Arc::new(FsLoader::new(site.root()));
    let analyzer = Analyzer::new(&root, false, "pages/index.html", Some(loader))?;

    assert_eq!(analyzer.dependencies().await?, vec!["/components/x-nav.html", "/shared/util.html"]);
    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.element_count(), 1);
    assert_eq!(tree.module_count(), 1);
    Ok(())
}
