use anyhow::Result;
use metatree::analyzer::Analyzer;
use metatree::core::MetatreeError;
use metatree::loader::{Loader, MemoryLoader};
use metatree::models::{DefinitionKind, TreeImport};
use metatree::test_utils::{DocumentFixture, init_test_logging};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn analyzer(root: &str, loader: &Arc<MemoryLoader>) -> Result<Analyzer> {
    init_test_logging(None);
    let loader: Arc<dyn Loader> = loader.clone();
    Ok(Analyzer::new(root, false, "index.html", Some(loader))?)
}

fn import_hrefs(imports: &[TreeImport]) -> Vec<&str> {
    imports.iter().map(TreeImport::href).collect()
}

#[tokio::test]
async fn test_document_without_imports_or_scripts() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new());
    let analyzer = analyzer("<!doctype html><p>hello</p>", &loader)?;

    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.href, "index.html");
    assert!(tree.elements.is_empty());
    assert!(tree.modules.is_empty());
    assert!(tree.imports.is_empty());

    let json = serde_json::to_value(&tree)?;
    assert_eq!(json["elements"], serde_json::json!([]));
    assert_eq!(json["modules"], serde_json::json!([]));
    assert_eq!(json["imports"], serde_json::json!([]));
    assert!(json.get("structure").is_some());
    assert_eq!(loader.total_requests(), 0);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_element_across_documents_fails() -> Result<()> {
    let loader = Arc::new(
        MemoryLoader::new()
            .with_document("a.html", DocumentFixture::new().element("x-foo").build())
            .with_document("b.html", DocumentFixture::new().element("x-foo").build()),
    );
    let root = DocumentFixture::new().import("a.html").import("b.html").build();

    let err = analyzer(&root, &loader)?.metadata_tree().await.unwrap_err();
    assert_eq!(err.conflicting_name(), Some("x-foo"));
    assert!(matches!(
        err,
        MetatreeError::DuplicateDefinition {
            kind: DefinitionKind::Element,
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_module_fails() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("util.html", DocumentFixture::new().module("util").build()));
    let root = DocumentFixture::new().module("util").import("util.html").build();

    let err = analyzer(&root, &loader)?.metadata_tree().await.unwrap_err();
    assert_eq!(err.conflicting_name(), Some("util"));
    Ok(())
}

#[tokio::test]
async fn test_cycle_yields_placeholder() -> Result<()> {
    let loader = Arc::new(
        MemoryLoader::new().with_document("b.html", DocumentFixture::new().import("index.html").element("x-b").build()),
    );
    let root = DocumentFixture::new().import("b.html").element("x-a").build();

    let tree = analyzer(&root, &loader)?.metadata_tree().await?;

    let b = tree.imports[0].as_node().expect("b.html is expanded");
    assert_eq!(b.href, "b.html");
    assert_eq!(b.elements[0].is, "x-b");
    assert_eq!(b.imports.len(), 1);
    assert!(b.imports[0].is_placeholder());
    assert_eq!(serde_json::to_value(&b.imports[0])?, serde_json::json!({}));
    Ok(())
}

#[tokio::test]
async fn test_repeated_import_expands_once() -> Result<()> {
    let loader =
        Arc::new(MemoryLoader::new().with_document("shared.html", DocumentFixture::new().element("x-shared").build()));
    let root = DocumentFixture::new().import("shared.html").import("shared.html").build();

    let tree = analyzer(&root, &loader)?.metadata_tree().await?;

    assert_eq!(import_hrefs(&tree.imports), vec!["shared.html", "shared.html"]);
    assert_eq!(tree.imports[0].as_node().map(|n| n.elements.len()), Some(1));
    assert!(tree.imports[1].is_placeholder());
    assert_eq!(loader.request_count("shared.html"), 1);
    Ok(())
}

#[tokio::test]
async fn test_diamond_fetches_shared_document_once() -> Result<()> {
    let loader = Arc::new(
        MemoryLoader::new()
            .with_document("a.html", DocumentFixture::new().import("shared.html").build())
            .with_document("b.html", DocumentFixture::new().import("shared.html").build())
            .with_document("shared.html", DocumentFixture::new().module("shared").build()),
    );
    let root = DocumentFixture::new().import("a.html").import("b.html").build();
    let analyzer = analyzer(&root, &loader)?;

    let tree = analyzer.metadata_tree().await?;

    let a = tree.imports[0].as_node().expect("a.html is expanded");
    let b = tree.imports[1].as_node().expect("b.html is expanded");
    assert!(a.imports[0].as_node().is_some());
    assert!(b.imports[0].is_placeholder());
    assert_eq!(tree.module_count(), 1);

    for href in ["a.html", "b.html", "shared.html"] {
        assert_eq!(loader.request_count(href), 1, "{href} fetched more than once");
    }
    assert_eq!(analyzer.documents(), vec!["a.html", "b.html", "index.html", "shared.html"]);
    Ok(())
}

#[tokio::test]
async fn test_template_binding() -> Result<()> {
    let root = DocumentFixture::new().template("x-other").template("x-foo").element("x-foo").element("x-bar").build();
    let analyzer = Analyzer::new(&root, false, "index.html", None)?;

    let tree = analyzer.metadata_tree().await?;

    let foo = &tree.elements[0];
    assert_eq!(foo.is, "x-foo");
    assert_eq!(foo.template, Some(1));
    assert_eq!(tree.template_for(foo).and_then(|t| t.attr("id")), Some("x-foo"));

    let bar = &tree.elements[1];
    assert_eq!(bar.is, "x-bar");
    assert_eq!(bar.template, None);
    Ok(())
}

#[tokio::test]
async fn test_binding_uses_own_document_only() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("a.html", DocumentFixture::new().template("x-root").build()));
    let root = DocumentFixture::new().import("a.html").element("x-root").build();

    let tree = analyzer(&root, &loader)?.metadata_tree().await?;
    assert_eq!(tree.elements[0].template, None);
    Ok(())
}

#[tokio::test]
async fn test_external_script_without_loader_contributes_nothing() -> Result<()> {
    let root = DocumentFixture::new().external_script("x-ext.js").element("x-inline").import("a.html").build();
    let analyzer = Analyzer::new(&root, false, "index.html", None)?;

    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.elements.len(), 1);
    assert_eq!(tree.elements[0].is, "x-inline");
    assert!(tree.imports.is_empty());
    assert!(analyzer.dependencies().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_external_script_with_loader() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("js/x-ext.js", "Polymer({is: 'x-ext'});\ndefine('ext', f);"));
    let root = DocumentFixture::new().template("x-ext").external_script("js/x-ext.js").build();

    let tree = analyzer(&root, &loader)?.metadata_tree().await?;
    assert_eq!(tree.elements[0].is, "x-ext");
    assert_eq!(tree.elements[0].script_href.as_deref(), Some("js/x-ext.js"));
    assert_eq!(tree.elements[0].template, Some(0));
    assert_eq!(tree.modules[0].is, "ext");
    Ok(())
}

#[tokio::test]
async fn test_import_order_is_independent_of_fetch_timing() -> Result<()> {
    let loader = Arc::new(
        MemoryLoader::new()
            .with_document("slow.html", DocumentFixture::new().element("x-slow").build())
            .with_document("fast.html", DocumentFixture::new().element("x-fast").build())
            .with_document("medium.html", DocumentFixture::new().element("x-medium").build())
            .with_delay("slow.html", Duration::from_millis(60))
            .with_delay("medium.html", Duration::from_millis(20)),
    );
    let root = DocumentFixture::new().import("slow.html").import("fast.html").import("medium.html").build();

    let tree = analyzer(&root, &loader)?.metadata_tree().await?;
    assert_eq!(import_hrefs(&tree.imports), vec!["slow.html", "fast.html", "medium.html"]);
    Ok(())
}

#[tokio::test]
async fn test_loader_failure_aborts_build() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("a.html", "<p>a</p>"));
    let root = DocumentFixture::new().import("a.html").import("missing.html").build();

    let err = analyzer(&root, &loader)?.metadata_tree().await.unwrap_err();
    match err {
        MetatreeError::Loader {
            href,
            ..
        } => assert_eq!(href, "missing.html"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_parse_failure_in_import_aborts_build() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("nested/broken.html", "<p>\n<!-- never closed"));
    let root = DocumentFixture::new().import("nested/broken.html").build();

    let err = analyzer(&root, &loader)?.metadata_tree().await.unwrap_err();
    match err {
        MetatreeError::Parse {
            href,
            reason,
        } => {
            assert_eq!(href, "nested/broken.html");
            assert!(reason.starts_with("line 2"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_attach_scripts() -> Result<()> {
    let root = DocumentFixture::new().element("x-a").build();
    let analyzer = Analyzer::new(&root, true, "index.html", None)?;

    let tree = analyzer.metadata_tree().await?;
    let script = tree.elements[0].script.as_deref().unwrap_or_default();
    assert!(script.contains("is: 'x-a'"));
    Ok(())
}

#[tokio::test]
async fn test_transitive_dependencies_breadth_first() -> Result<()> {
    let loader = Arc::new(
        MemoryLoader::new()
            .with_document("elements/a.html", DocumentFixture::new().import("../shared/c.html").build())
            .with_document("elements/b.html", DocumentFixture::new().import("a.html").build())
            .with_document("shared/c.html", DocumentFixture::new().import("../index.html").build()),
    );
    let root = DocumentFixture::new().import("elements/a.html").import("elements/b.html").build();
    let analyzer = analyzer(&root, &loader)?;

    assert_eq!(analyzer.dependencies().await?, vec!["elements/a.html", "elements/b.html", "shared/c.html"]);

    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.expanded_hrefs(), vec!["index.html", "elements/a.html", "shared/c.html", "elements/b.html"]);
    Ok(())
}

#[tokio::test]
async fn test_construction_starts_fetching_imports() -> Result<()> {
    let loader = Arc::new(MemoryLoader::new().with_document("a.html", DocumentFixture::new().element("x-a").build()));
    let root = DocumentFixture::new().import("a.html").build();

    let analyzer = analyzer(&root, &loader)?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(loader.request_count("a.html"), 1);

    let tree = analyzer.metadata_tree().await?;
    assert_eq!(tree.element_count(), 1);
    assert_eq!(loader.request_count("a.html"), 1);
    Ok(())
}

#[tokio::test]
async fn test_sibling_subtrees_fetch_concurrently() -> Result<()> {
    let delay = Duration::from_millis(200);
    let mut loader = MemoryLoader::new();
    let mut root = DocumentFixture::new();
    for name in ["a", "b", "c"] {
        let child = format!("{name}.html");
        let grandchild = format!("{name}/leaf.html");
        loader = loader
            .with_document(&child, DocumentFixture::new().import(&format!("{name}/leaf.html")).build())
            .with_document(&grandchild, DocumentFixture::new().element(&format!("x-{name}")).build())
            .with_delay(&grandchild, delay);
        root = root.import(&child);
    }
    let loader = Arc::new(loader);

    let started = Instant::now();
    let tree = analyzer(&root.build(), &loader)?.metadata_tree().await?;
    let elapsed = started.elapsed();

    assert_eq!(import_hrefs(&tree.imports), vec!["a.html", "b.html", "c.html"]);
    assert_eq!(tree.element_count(), 3);
    assert!(elapsed < delay * 2, "subtrees were fetched one after another: {elapsed:?}");
    Ok(())
}
