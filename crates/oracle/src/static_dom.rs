use crate::{ElementInfo, OracleError, PresenceOracle};
use html::StaticDom;
use scraper::{ElementRef, Html, Selector};

/// Oracle over a snapshot of the stubbed static DOM.
///
/// The snapshot is taken when the oracle is built; later DOM mutations are not seen.
pub struct StaticOracle {
    document: Html,
}

fn element_info(element: ElementRef<'_>) -> ElementInfo {
    let value = element.value();
    ElementInfo {
        id: value.attr("id").unwrap_or_default().to_owned(),
        class_name: value.attr("class").unwrap_or_default().to_owned(),
    }
}

impl StaticOracle {
    pub fn new(dom: &StaticDom) -> Self {
        Self::from_html(&dom.to_html())
    }

    pub fn from_html(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn selector(selector: &str) -> Result<Selector, OracleError> {
        Selector::parse(selector).map_err(|err| OracleError::InvalidSelector {
            selector: selector.to_owned(),
            reason: err.to_string(),
        })
    }
}

impl PresenceOracle for StaticOracle {
    async fn count(&self, selector: &str) -> Result<usize, OracleError> {
        let parsed = Self::selector(selector)?;
        Ok(self.document.select(&parsed).count())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, OracleError> {
        let parsed = Self::selector(selector)?;
        Ok(self.document.select(&parsed).map(element_info).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count_or_used;
    use anyhow::Result;
    use html::stubs::stub_page;

    #[tokio::test]
    async fn counts_matches_in_the_stubbed_dom() -> Result<()> {
        let mut dom = StaticDom::parse("<div class=used></div><amp-img src=a></amp-img>")?;
        stub_page(&mut dom);
        let oracle = StaticOracle::new(&dom);
        assert_eq!(oracle.count(".used").await?, 1);
        assert_eq!(oracle.count(".unused").await?, 0);
        assert_eq!(oracle.count("amp-img > img.i-amphtml-replaced-content").await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn unparsable_selectors_are_errors() {
        let oracle = StaticOracle::from_html("<p></p>");
        assert!(matches!(
            oracle.count("p:::").await,
            Err(OracleError::InvalidSelector { .. })
        ));
        assert_eq!(count_or_used(&oracle, "p:::").await, 1);
    }

    #[tokio::test]
    async fn query_all_reports_ids_and_classes() -> Result<()> {
        let oracle = StaticOracle::from_html("<p id=x class=\"a b\"></p>");
        let elements = oracle.query_all("p").await?;
        assert_eq!(
            elements,
            vec![ElementInfo {
                id: "x".to_owned(),
                class_name: "a b".to_owned(),
            }]
        );
        Ok(())
    }
}
