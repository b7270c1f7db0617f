use css::SelectorCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Removals within one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedSelectors {
    pub count: usize,
    pub selectors: Vec<String>,
}

/// Removals keyed by category name (`general`, `pseudo`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovalStats(BTreeMap<String, RemovedSelectors>);

impl RemovalStats {
    pub fn record(&mut self, category: SelectorCategory, selector: &str) {
        let entry = self.0.entry(category.as_str().to_owned()).or_default();
        entry.count += 1;
        entry.selectors.push(selector.to_owned());
    }

    pub fn get(&self, category: SelectorCategory) -> Option<&RemovedSelectors> {
        self.0.get(category.as_str())
    }

    /// Number of removals in `category`.
    pub fn count(&self, category: SelectorCategory) -> usize {
        self.get(category).map_or(0, |removed| removed.count)
    }

    /// Removals across every category.
    pub fn total(&self) -> usize {
        self.0.values().map(|removed| removed.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &RemovedSelectors)> {
        self.0.iter().map(|(name, removed)| (name.as_str(), removed))
    }
}
