mod common;

use amp_uncss::{AmpUncssConfig, DocumentStatus, OptimizationLevel, SourceDocument, Tier};
use anyhow::{Result, anyhow};
use common::{custom_css, fixture, fixture_text, run, streamable};
use css::SelectorCategory;
use std::env;
use std::fs;
use std::path::PathBuf;

#[tokio::test]
async fn unused_rule_is_dropped_at_level_zero() -> Result<()> {
    let output = run(streamable(AmpUncssConfig::default()), vec![fixture("simple.html")?]).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(custom_css(&stream.optimized_html), Some(".used{color:red}"));
    assert!(stream.optimized_html.contains("<style amp-boilerplate>body{visibility:hidden}</style>"));
    assert!(stream.optimized_html.contains("<div class=\"used\">hello</div>"));
    assert_eq!(stream.report.status, DocumentStatus::Complete);
    assert_eq!(stream.report.tier, Some(Tier::Static));
    assert_eq!(stream.report.selectors_removed.count(SelectorCategory::General), 1);
    assert!(stream.report.output_size < stream.report.input_size);
    Ok(())
}

#[tokio::test]
async fn component_markup_keeps_runtime_classes() -> Result<()> {
    let output = run(streamable(AmpUncssConfig::default()), vec![fixture("components.html")?]).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    let css = custom_css(&stream.optimized_html).ok_or_else(|| anyhow!("no amp-custom block"))?;

    for kept in [
        ".hero{display:block}",
        ".hero:hover{opacity:0.5}",
        ".i-amphtml-layout-responsive{display:block}",
        ".i-amphtml-sizer{display:block}",
        "amp-img{max-width:100%}",
        ".i-amphtml-accordion-header{cursor:pointer}",
        ".menu > li:hover{color:red}",
        ".md\\:flex{display:flex}",
        "@keyframes spin{",
    ] {
        assert!(css.contains(kept), "`{kept}` missing from {css}");
    }
    for removed in [
        "amp-carousel{",
        ".amp-carousel-slide",
        ".lg\\:grid",
        ".gone",
        "@media",
        "@keyframes unused",
        ".empty",
    ] {
        assert!(!css.contains(removed), "`{removed}` still in {css}");
    }

    let stats = &stream.report.selectors_removed;
    assert_eq!(stats.count(SelectorCategory::AmpElement), 1);
    assert_eq!(stats.count(SelectorCategory::EscapedPseudo), 1);
    assert_eq!(stats.count(SelectorCategory::Keyframes), 1);
    assert_eq!(stats.count(SelectorCategory::Empty), 1);
    // Runtime markup from the stubs never reaches the output.
    assert!(!stream.optimized_html.contains("i-amphtml-sizer\""));
    Ok(())
}

#[tokio::test]
async fn runtime_components_limit_level_zero() -> Result<()> {
    let output = run(streamable(AmpUncssConfig::default()), vec![fixture("list.html")?]).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(custom_css(&stream.optimized_html), Some(".row{color:red}.never{color:blue}"));
    assert_eq!(stream.report.tier, Some(Tier::Static));
    assert!(stream.report.has_exception_tags);
    Ok(())
}

#[tokio::test]
async fn one_bad_document_does_not_stop_the_batch() -> Result<()> {
    let target = tempfile::tempdir()?;
    let simple = fixture_text("simple.html")?;
    let config = AmpUncssConfig {
        target_directory: target.path().to_path_buf(),
        ..AmpUncssConfig::default()
    };
    let documents = vec![
        SourceDocument::from_memory("one.html", simple.clone()),
        SourceDocument::from_memory("two.html", ""),
        SourceDocument::from_memory("three.html", simple),
    ];
    let output = run(config, documents).await?;
    let statuses: Vec<_> = output.report.files.iter().map(|file| file.status).collect();
    assert_eq!(
        statuses,
        [DocumentStatus::Complete, DocumentStatus::Failed, DocumentStatus::Complete]
    );
    assert_eq!(output.report.optimized, 2);
    assert_eq!(output.report.failed, 1);
    assert_eq!(output.report.files[1].failure.as_deref(), Some("parse error: input is empty"));
    assert!(output.stream.is_none());

    let written = fs::read_to_string(target.path().join("three.html"))?;
    assert_eq!(custom_css(&written), Some(".used{color:red}"));
    assert_eq!(fs::read(target.path().join("two.html"))?, b"");
    Ok(())
}

#[tokio::test]
async fn outputs_carry_the_filename_decorator() -> Result<()> {
    let target = tempfile::tempdir()?;
    let nested = target.path().join("out");
    let config = AmpUncssConfig {
        target_directory: nested.clone(),
        filename_decorator: "-min".to_owned(),
        batch_size: 1,
        ..AmpUncssConfig::default()
    };
    let output = run(config, vec![fixture("simple.html")?, fixture("list.html")?]).await?;
    assert!(!output.report.has_failures());
    assert!(nested.join("simple-min.html").is_file());
    assert!(nested.join("list-min.html").is_file());
    Ok(())
}

#[tokio::test]
async fn whitelisted_selectors_survive() -> Result<()> {
    let config = AmpUncssConfig {
        selector_whitelist: vec!["/^\\.un/".to_owned()],
        ..AmpUncssConfig::default()
    };
    let output = run(streamable(config), vec![fixture("simple.html")?]).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(custom_css(&stream.optimized_html), Some(".used{color:red}.unused{color:blue}"));
    assert!(stream.report.selectors_removed.is_empty());
    Ok(())
}

#[tokio::test]
async fn optimizing_twice_changes_nothing() -> Result<()> {
    let first = run(streamable(AmpUncssConfig::default()), vec![fixture("components.html")?])
        .await?
        .stream
        .ok_or_else(|| anyhow!("streamable run returned no document"))?;
    let second = run(
        streamable(AmpUncssConfig::default()),
        vec![SourceDocument::from_memory("again.html", first.optimized_html.clone())],
    )
    .await?
    .stream
    .ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(custom_css(&first.optimized_html), custom_css(&second.optimized_html));
    assert!(second.report.selectors_removed.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_browser_fails_only_browser_documents() -> Result<()> {
    let target = tempfile::tempdir()?;
    let config = AmpUncssConfig {
        optimization_level: OptimizationLevel::Browser,
        chrome_executable: Some(PathBuf::from("/nonexistent/chrome")),
        target_directory: target.path().to_path_buf(),
        ..AmpUncssConfig::default()
    };
    let output = run(config, vec![fixture("simple.html")?, fixture("list.html")?]).await?;
    let [simple, list] = output.report.files.as_slice() else {
        return Err(anyhow!("expected two reports, got {}", output.report.files.len()));
    };
    assert_eq!(simple.status, DocumentStatus::Complete);
    assert_eq!(simple.tier, Some(Tier::Static));
    assert_eq!(list.status, DocumentStatus::Failed);
    assert_eq!(list.tier, Some(Tier::Browser));
    assert!(
        list.failure.as_deref().is_some_and(|failure| failure.starts_with("browser error")),
        "{:?}",
        list.failure
    );
    assert_eq!(fs::read_to_string(target.path().join("list.html"))?, fixture_text("list.html")?);
    Ok(())
}

#[tokio::test]
async fn invalid_configs_are_rejected_up_front() {
    let config = AmpUncssConfig {
        batch_size: 0,
        ..AmpUncssConfig::default()
    };
    assert!(matches!(run(config, Vec::new()).await, Err(_)));
}

#[tokio::test]
#[ignore = "requires a Chrome/Chromium install"]
async fn browser_tier_checks_rendered_markup() -> Result<()> {
    let config = AmpUncssConfig {
        optimization_level: OptimizationLevel::Browser,
        chrome_executable: env::var_os("CHROME_BIN").map(PathBuf::from),
        ..AmpUncssConfig::default()
    };
    let output = run(streamable(config), vec![fixture("list.html")?]).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(stream.report.status, DocumentStatus::Complete);
    assert_eq!(stream.report.tier, Some(Tier::Browser));
    let css = custom_css(&stream.optimized_html).ok_or_else(|| anyhow!("no amp-custom block"))?;
    assert!(!css.contains(".never"), "{css}");
    assert!(!css.contains("amp-sidebar"), "{css}");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome/Chromium install"]
async fn in_memory_documents_reach_the_browser() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let config = AmpUncssConfig {
        optimization_level: OptimizationLevel::Browser,
        temp_directory: Some(temp.path().to_path_buf()),
        chrome_executable: env::var_os("CHROME_BIN").map(PathBuf::from),
        ..AmpUncssConfig::default()
    };
    let documents = vec![SourceDocument::from_memory("list.html", fixture_text("list.html")?)];
    let output = run(streamable(config), documents).await?;
    let stream = output.stream.ok_or_else(|| anyhow!("streamable run returned no document"))?;
    assert_eq!(stream.report.status, DocumentStatus::Complete);
    assert!(stream.report.warnings.is_empty(), "{:?}", stream.report.warnings);
    assert_eq!(fs::read_dir(temp.path())?.count(), 0);
    Ok(())
}
