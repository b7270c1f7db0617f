use crate::browser::BrowserOptions;
use crate::{ElementInfo, OracleError, PresenceOracle};
use anyhow::{Context as _, Result, anyhow};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tokio::time::{Instant, sleep, timeout};
use url::Url;

/// Opens every collapsed accordion section and closed `<details>`; evaluates to the number touched.
const EXPAND_SCRIPT: &str = r"(() => {
    let touched = 0;
    document.querySelectorAll('amp-accordion > section:not([expanded]) > :first-child').forEach((header) => {
        header.click();
        touched += 1;
    });
    document.querySelectorAll('details:not([open])').forEach((details) => {
        details.open = true;
        touched += 1;
    });
    return touched;
})()";

/// `file://` URL for `path`, canonicalized when possible.
///
/// # Errors
///
/// Returns an error if the path cannot be expressed as a URL.
pub fn to_file_url(path: &Path) -> Result<Url> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&canonical)
        .map_err(|()| anyhow!("invalid file path for URL: {}", canonical.display()))
}

/// JavaScript string literal holding `text`.
fn js_string(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}

fn count_script(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", js_string(selector))
}

fn query_all_script(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({}), (element) => ({{ \
         id: element.id || '', \
         className: element.getAttribute('class') || '' }}))",
        js_string(selector)
    )
}

/// Oracle backed by one live Chrome tab.
pub struct ChromeOracle {
    page: Option<Page>,
}

impl ChromeOracle {
    /// Navigate `page` to `path`, expand collapsed content and wait for it to settle.
    ///
    /// The page is closed again when preparation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails or times out.
    pub(crate) async fn prepare(page: Page, path: &Path, options: &BrowserOptions) -> Result<Self> {
        match navigate(&page, path, options).await {
            Ok(()) => Ok(Self { page: Some(page) }),
            Err(err) => {
                let _ignore_close_error = page.close().await;
                Err(err)
            }
        }
    }

    fn page(&self) -> Result<&Page, OracleError> {
        self.page
            .as_ref()
            .ok_or_else(|| OracleError::Browser("page already closed".to_owned()))
    }

    async fn evaluate<T: DeserializeOwned>(&self, selector: &str, script: String) -> Result<T, OracleError> {
        let page = self.page()?;
        let result = page.evaluate(script).await.map_err(|err| match err {
            CdpError::JavascriptException(details) => OracleError::InvalidSelector {
                selector: selector.to_owned(),
                reason: details.text.clone(),
            },
            other => OracleError::Browser(other.to_string()),
        })?;
        result
            .into_value::<T>()
            .map_err(|err| OracleError::Browser(format!("unexpected query result: {err}")))
    }
}

async fn navigate(page: &Page, path: &Path, options: &BrowserOptions) -> Result<()> {
    let url = to_file_url(path)?;
    log::debug!("navigating to {url}");
    let start = Instant::now();

    timeout(options.navigation_timeout, page.goto(url.as_str()))
        .await
        .map_err(|_elapsed| anyhow!("navigation to {url} timed out"))?
        .with_context(|| format!("navigation to {url} failed"))?;
    timeout(options.navigation_timeout, page.wait_for_navigation())
        .await
        .map_err(|_elapsed| anyhow!("waiting for {url} to load timed out"))?
        .with_context(|| format!("waiting for {url} to load failed"))?;

    let touched: usize = page
        .evaluate(EXPAND_SCRIPT)
        .await
        .context("failed to expand collapsed content")?
        .into_value()
        .context("unexpected expansion result")?;
    sleep(options.settle).await;
    log::debug!("{url} ready in {:?}, {touched} collapsed elements expanded", start.elapsed());
    Ok(())
}

impl PresenceOracle for ChromeOracle {
    async fn count(&self, selector: &str) -> Result<usize, OracleError> {
        self.evaluate(selector, count_script(selector)).await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, OracleError> {
        self.evaluate(selector, query_all_script(selector)).await
    }

    async fn shutdown(&mut self) {
        if let Some(page) = self.page.take()
            && let Err(err) = page.close().await
        {
            log::debug!("closing page failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn selectors_are_quoted_for_javascript() {
        assert_eq!(
            count_script("a[title=\"x\"]\\:hover"),
            r#"document.querySelectorAll("a[title=\"x\"]\\:hover").length"#
        );
        assert!(query_all_script("'").contains(r#"querySelectorAll("'")"#));
    }

    #[test]
    fn file_urls_are_absolute() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("page.html");
        fs::write(&file, "<p></p>")?;
        let url = to_file_url(&file)?;
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/page.html"));
        Ok(())
    }

    #[tokio::test]
    async fn closed_oracle_rejects_queries() {
        let mut oracle = ChromeOracle { page: None };
        oracle.shutdown().await;
        assert!(matches!(oracle.count("p").await, Err(OracleError::Browser(_))));
    }
}
