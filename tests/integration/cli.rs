use anyhow::Result;
use assert_cmd::Command;
use metatree::test_utils::DocumentFixture;
use predicates::prelude::*;

use crate::common::TestSite;

fn sample_site() -> Result<TestSite> {
    let site = TestSite::new()?;
    site.write(
        "index.html",
        &DocumentFixture::new().import("elements/x-button.html").import("elements/x-card.html").element("x-app").build(),
    )?;
    site.write(
        "elements/x-button.html",
        &DocumentFixture::new().import("../shared/util.html").template("x-button").element("x-button").build(),
    )?;
    site.write(
        "elements/x-card.html",
        &DocumentFixture::new().import("../shared/util.html").element("x-card").build(),
    )?;
    site.write("shared/util.html", &DocumentFixture::new().module("util").build())?;
    Ok(site)
}

fn metatree(site: &TestSite) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_metatree"));
    cmd.current_dir(site.root()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tree_command_renders_imports() -> Result<()> {
    let site = sample_site()?;

    let output = site.run_metatree(&["tree", "index.html"])?;
    output
        .assert_success()
        .assert_stdout_contains("index.html [x-app]")
        .assert_stdout_contains("├── elements/x-button.html [x-button]")
        .assert_stdout_contains("│   └── shared/util.html {util}")
        .assert_stdout_contains("└── elements/x-card.html [x-card]")
        .assert_stdout_contains("    └── shared/util.html (*)")
        .assert_stdout_contains("(*) = already visited");
    Ok(())
}

#[test]
fn test_tree_command_json() -> Result<()> {
    let site = sample_site()?;

    let output = site.run_metatree(&["tree", "index.html", "--format", "json"])?;
    output.assert_success();

    let json: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(json["href"], "index.html");
    assert_eq!(json["elements"][0]["is"], "x-app");
    assert_eq!(json["imports"][0]["elements"][0]["template"], 0);
    assert_eq!(json["imports"][1]["imports"][0], serde_json::json!({}));
    Ok(())
}

#[test]
fn test_tree_command_depth_and_no_imports() -> Result<()> {
    let site = sample_site()?;

    metatree(&site)
        .args(["tree", "index.html", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elements/x-card.html"))
        .stdout(predicate::str::contains("shared/util.html").not());

    metatree(&site)
        .args(["tree", "index.html", "--no-imports", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("element x-app"))
        .stdout(predicate::str::contains("elements/").not());
    Ok(())
}

#[test]
fn test_deps_command() -> Result<()> {
    let site = sample_site()?;

    metatree(&site).args(["deps", "index.html"]).assert().success().stdout(
        "elements/x-button.html\nelements/x-card.html\nshared/util.html\n",
    );
    Ok(())
}

#[test]
fn test_duplicate_definition_reports_name() -> Result<()> {
    let site = TestSite::new()?;
    site.write("index.html", &DocumentFixture::new().import("a.html").element("x-dup").build())?;
    site.write("a.html", &DocumentFixture::new().element("x-dup").build())?;

    metatree(&site)
        .args(["tree", "index.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Duplicate element definition 'x-dup'"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_missing_document_fails() -> Result<()> {
    let site = TestSite::new()?;

    metatree(&site)
        .args(["tree", "nope.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.html"));
    Ok(())
}

#[test]
fn test_invalid_format_is_rejected() -> Result<()> {
    let site = sample_site()?;

    metatree(&site)
        .args(["tree", "index.html", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
    Ok(())
}

#[test]
fn test_config_file_next_to_document() -> Result<()> {
    let site = sample_site()?;
    site.write("metatree.toml", "follow_imports = false\n")?;

    metatree(&site).args(["deps", "index.html"]).assert().success().stdout("");

    site.write("metatree.toml", "unknown_key = true\n")?;
    metatree(&site)
        .args(["deps", "index.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}
