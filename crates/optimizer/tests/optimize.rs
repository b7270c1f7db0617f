use anyhow::Result;
use css::{SelectorCategory, classify, parse_stylesheet};
use html::StaticDom;
use html::stubs::{exception_tags, stub_page};
use optimizer::{RemovalStats, Whitelist, optimize_static, optimize_with_browser};
use oracle::{ElementInfo, OracleError, PresenceOracle, StaticOracle};

/// Stub `html`, then run the static tier over `css`.
async fn optimize(html: &str, css: &str, whitelist: &[&str]) -> Result<(String, RemovalStats)> {
    let _ignore = env_logger::builder().is_test(true).try_init();
    let mut dom = StaticDom::parse(html)?;
    stub_page(&mut dom);
    let has_exception_tags = !exception_tags(&dom).is_empty();
    let oracle = StaticOracle::new(&dom);
    let mut sheet = parse_stylesheet(css);
    let classified = classify(&sheet);
    let whitelist = Whitelist::new(whitelist)?;
    let stats = optimize_static(&mut sheet, &classified, &whitelist, has_exception_tags, &oracle).await;
    Ok((sheet.to_css(), stats))
}

/// Backend standing in for a browser that lost its connection.
struct Disconnected;

impl PresenceOracle for Disconnected {
    async fn count(&self, _selector: &str) -> Result<usize, OracleError> {
        Err(OracleError::Browser("target closed".to_owned()))
    }

    async fn query_all(&self, _selector: &str) -> Result<Vec<ElementInfo>, OracleError> {
        Err(OracleError::Browser("target closed".to_owned()))
    }
}

#[tokio::test]
async fn unused_simple_selector_is_removed() -> Result<()> {
    let (css, stats) = optimize(
        "<div class=\"used\"></div>",
        ".used{color:red}.unused{color:blue}",
        &[],
    )
    .await?;
    assert_eq!(css, ".used{color:red}");
    assert_eq!(stats.count(SelectorCategory::General), 1);
    assert_eq!(
        stats.get(SelectorCategory::General).map(|removed| removed.selectors.clone()),
        Some(vec![".unused".to_owned()])
    );
    Ok(())
}

#[tokio::test]
async fn empty_rules_go_even_when_whitelisted() -> Result<()> {
    let (css, stats) = optimize("<p class=a></p>", ".a{}.a{color:red}", &[".a"]).await?;
    assert_eq!(css, ".a{color:red}");
    assert_eq!(stats.count(SelectorCategory::Empty), 1);
    Ok(())
}

#[tokio::test]
async fn comma_groups_are_all_or_nothing() -> Result<()> {
    let (css, stats) = optimize(
        "<p class=a></p>",
        ".zz, .a{color:red}.zz, .yy{color:blue}",
        &[],
    )
    .await?;
    assert_eq!(css, ".zz, .a{color:red}");
    assert_eq!(stats.count(SelectorCategory::CommaGroup), 1);
    Ok(())
}

#[tokio::test]
async fn comma_group_branches_use_their_own_strategy() -> Result<()> {
    let (css, _) = optimize(
        "<a class=\"btn\"></a><b class=\"md:flex\"></b>",
        ".zz, .btn:hover{color:red}.zz, .md\\:flex{display:flex}.zz, ::-webkit-scrollbar{width:0}.zz, .yy:hover{color:blue}",
        &[],
    )
    .await?;
    assert_eq!(
        css,
        ".zz, .btn:hover{color:red}.zz, .md\\:flex{display:flex}.zz, ::-webkit-scrollbar{width:0}"
    );
    Ok(())
}

#[tokio::test]
async fn pseudo_selectors_fall_back_to_their_base() -> Result<()> {
    let (css, stats) = optimize(
        "<ul class=menu><li>x</li></ul>",
        ".menu > li:hover{color:red}.gone:focus{color:blue}::selection{color:green}.menu::after{content:\"\"}",
        &[],
    )
    .await?;
    assert_eq!(css, ".menu > li:hover{color:red}::selection{color:green}.menu::after{content:\"\"}");
    assert_eq!(
        stats.get(SelectorCategory::Pseudo).map(|removed| removed.selectors.clone()),
        Some(vec![".gone:focus".to_owned()])
    );
    Ok(())
}

#[tokio::test]
async fn escaped_selectors_match_literal_classes() -> Result<()> {
    let (css, stats) = optimize(
        "<a class=\"hover:underline\" id=\"a.b\"></a>",
        ".hover\\:underline:hover{text-decoration:underline}.md\\:flex{display:flex}#a\\.b{color:red}",
        &[],
    )
    .await?;
    assert_eq!(css, ".hover\\:underline:hover{text-decoration:underline}#a\\.b{color:red}");
    assert_eq!(stats.count(SelectorCategory::EscapedPseudo), 1);
    Ok(())
}

#[tokio::test]
async fn keyframes_live_only_while_referenced() -> Result<()> {
    let (css, stats) = optimize(
        "<div class=spinner></div>",
        "@keyframes spin{from{opacity:0}to{opacity:1}}\
         @keyframes fade{from{opacity:1}to{opacity:0}}\
         @-webkit-keyframes pulse{from{opacity:1}to{opacity:0}}\
         .spinner{animation:spin 1s linear}\
         .gone{animation-name:pulse}",
        &[],
    )
    .await?;
    assert_eq!(css, "@keyframes spin{from{opacity:0}to{opacity:1}}.spinner{animation:spin 1s linear}");
    assert_eq!(
        stats.get(SelectorCategory::Keyframes).map(|removed| removed.selectors.clone()),
        Some(vec!["@keyframes fade".to_owned(), "@keyframes pulse".to_owned()])
    );
    Ok(())
}

#[tokio::test]
async fn whitelist_overrides_usage() -> Result<()> {
    let (css, stats) = optimize(
        "<p></p>",
        ".keep{color:red}.js-open{color:blue}.zz, .keep-too{color:green}@keyframes spin{to{opacity:0}}.drop{color:black}",
        &[".keep", "/^\\.js-/", ".keep-too", "spin"],
    )
    .await?;
    assert_eq!(
        css,
        ".keep{color:red}.js-open{color:blue}.zz, .keep-too{color:green}@keyframes spin{to{opacity:0}}"
    );
    assert_eq!(stats.total(), 1);
    Ok(())
}

#[tokio::test]
async fn amp_element_rules_follow_the_static_dom() -> Result<()> {
    let (css, stats) = optimize(
        "<amp-img src=a width=1 height=1 layout=fixed></amp-img>",
        "amp-img{display:block}amp-carousel{display:block}.i-amphtml-layout-fixed{display:inline-block}",
        &[],
    )
    .await?;
    assert_eq!(css, "amp-img{display:block}.i-amphtml-layout-fixed{display:inline-block}");
    assert_eq!(stats.count(SelectorCategory::AmpElement), 1);
    Ok(())
}

#[tokio::test]
async fn exception_tags_limit_the_static_tier() -> Result<()> {
    let (css, stats) = optimize(
        "<amp-list src=x.json><template type=amp-mustache><p class=row></p></template></amp-list>",
        ".unused{color:red}amp-carousel{display:block}.e{}",
        &[],
    )
    .await?;
    assert_eq!(css, ".unused{color:red}");
    assert_eq!(stats.count(SelectorCategory::AmpElement), 1);
    assert_eq!(stats.count(SelectorCategory::Empty), 1);
    Ok(())
}

#[tokio::test]
async fn emptied_groups_are_pruned() -> Result<()> {
    let (css, stats) = optimize(
        "<p class=a></p>",
        "@media print{.gone{color:red}}@supports (display:grid){.a{display:grid}}",
        &[],
    )
    .await?;
    assert_eq!(css, "@supports (display:grid){.a{display:grid}}");
    assert_eq!(stats.total(), 1);
    Ok(())
}

#[tokio::test]
async fn second_run_removes_nothing() -> Result<()> {
    let html = "<div class=a><span></span></div>";
    let css = ".a{color:red}.b{color:blue}@media print{.c{x:y}}.a:hover,.d{color:green}@keyframes k{to{opacity:0}}";
    let (first, first_stats) = optimize(html, css, &[]).await?;
    let (second, second_stats) = optimize(html, &first, &[]).await?;
    assert!(first_stats.total() > 0);
    assert_eq!(first, second);
    assert!(second_stats.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_browser_keeps_selectors() -> Result<()> {
    let _ignore = env_logger::builder().is_test(true).try_init();
    let mut dom = StaticDom::parse("<amp-list src=x></amp-list>")?;
    stub_page(&mut dom);
    let static_oracle = StaticOracle::new(&dom);
    let mut sheet = parse_stylesheet(".a{color:red}.b:hover{color:blue}.c\\:d{x:y}.e, .f{x:y}amp-sidebar{x:y}.g{}");
    let classified = classify(&sheet);
    let stats = optimize_with_browser(
        &mut sheet,
        &classified,
        &Whitelist::default(),
        &static_oracle,
        &Disconnected,
    )
    .await;
    assert_eq!(sheet.to_css(), ".a{color:red}.b:hover{color:blue}.c\\:d{x:y}.e, .f{x:y}");
    assert_eq!(stats.count(SelectorCategory::AmpElement), 1);
    assert_eq!(stats.count(SelectorCategory::Empty), 1);
    assert_eq!(stats.total(), 2);
    Ok(())
}

#[tokio::test]
async fn browser_tier_queries_the_browser_after_static_passes() -> Result<()> {
    // The static DOM has no `.rendered`; the browser-side oracle does.
    let dom = StaticDom::parse("<amp-list src=x></amp-list>")?;
    let static_oracle = StaticOracle::new(&dom);
    let rendered = StaticOracle::from_html("<amp-list><div class=rendered></div></amp-list>");
    let mut sheet = parse_stylesheet(".rendered{color:red}.never{color:blue}");
    let classified = classify(&sheet);
    let stats = optimize_with_browser(
        &mut sheet,
        &classified,
        &Whitelist::default(),
        &static_oracle,
        &rendered,
    )
    .await;
    assert_eq!(sheet.to_css(), ".rendered{color:red}");
    assert_eq!(stats.count(SelectorCategory::General), 1);
    Ok(())
}
