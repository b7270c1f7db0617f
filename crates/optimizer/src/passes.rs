//! Removal passes over one stylesheet.
//!
//! Every pass deletes by selector text, so running a pass twice changes nothing
//! the second time.

use crate::stats::RemovalStats;
use crate::whitelist::Whitelist;
use css::classify::classify_selector;
use css::selector::{LiteralKind, escaped_literal, queryable_base};
use css::{ClassifiedSelector, ClassifiedSelectors, SelectorCategory, Stylesheet};
use oracle::{ElementInfo, PresenceOracle, count_or_used, query_all_or_none};

/// Every element of the document, fetched on first use.
struct Universe<'oracle, O> {
    oracle: &'oracle O,
    elements: Option<Option<Vec<ElementInfo>>>,
}

impl<'oracle, O: PresenceOracle> Universe<'oracle, O> {
    const fn new(oracle: &'oracle O) -> Self {
        Self {
            oracle,
            elements: None,
        }
    }

    /// Whether some element carries the unescaped class or id `selector` starts with.
    ///
    /// Selectors that do not start with `.` or `#`, and failed lookups, count as used.
    async fn literal_used(&mut self, selector: &str) -> bool {
        let Some(literal) = escaped_literal(selector) else {
            return true;
        };
        if self.elements.is_none() {
            self.elements = Some(query_all_or_none(self.oracle, "*").await);
        }
        let Some(Some(elements)) = &self.elements else {
            return true;
        };
        match literal.kind {
            LiteralKind::Class => elements.iter().any(|element| element.has_class(&literal.name)),
            LiteralKind::Id => elements.iter().any(|element| element.id == literal.name),
        }
    }
}

async fn matches_any<O: PresenceOracle>(oracle: &O, selector: &str) -> bool {
    count_or_used(oracle, selector).await > 0
}

/// A pseudo selector is used when its base matches; an empty base always is.
async fn base_used<O: PresenceOracle>(oracle: &O, base: &str) -> bool {
    let base = queryable_base(base);
    base.is_empty() || matches_any(oracle, base).await
}

/// Applies removal passes to a stylesheet and records what it removed.
pub struct Optimizer<'sheet> {
    sheet: &'sheet mut Stylesheet,
    whitelist: &'sheet Whitelist,
    stats: RemovalStats,
}

impl<'sheet> Optimizer<'sheet> {
    pub fn new(sheet: &'sheet mut Stylesheet, whitelist: &'sheet Whitelist) -> Self {
        Self {
            sheet,
            whitelist,
            stats: RemovalStats::default(),
        }
    }

    fn remove(&mut self, category: SelectorCategory, selector: &str) {
        if self.sheet.remove_selector(selector) > 0 {
            log::debug!("removed {} selector `{selector}`", category.as_str());
            self.stats.record(category, selector);
        }
    }

    /// Delete rules with an empty block. The whitelist does not apply.
    pub fn remove_empty_rules(&mut self) {
        for selector in self.sheet.remove_empty_rules() {
            log::debug!("removed empty rule `{selector}`");
            self.stats.record(SelectorCategory::Empty, &selector);
        }
    }

    /// Delete bare `amp-*` tag rules whose element is absent.
    pub async fn remove_unused_amp_elements<O: PresenceOracle>(
        &mut self,
        classified: &ClassifiedSelectors,
        oracle: &O,
    ) {
        for entry in classified.of(SelectorCategory::AmpElement) {
            let ClassifiedSelector::AmpElement(tag) = entry else {
                continue;
            };
            if self.whitelist.protects(tag) || matches_any(oracle, tag).await {
                continue;
            }
            self.remove(SelectorCategory::AmpElement, tag);
        }
    }

    /// Comma groups, simple, pseudo and escaped selectors, then keyframes.
    pub async fn remove_unused_selectors<O: PresenceOracle>(
        &mut self,
        classified: &ClassifiedSelectors,
        oracle: &O,
    ) {
        let mut universe = Universe::new(oracle);
        self.remove_unused_groups(classified, oracle, &mut universe).await;

        for entry in classified.of(SelectorCategory::General) {
            if let ClassifiedSelector::Simple(selector) = entry
                && !self.whitelist.protects(selector)
                && !matches_any(oracle, selector).await
            {
                self.remove(SelectorCategory::General, selector);
            }
        }

        for entry in classified.of(SelectorCategory::Pseudo) {
            if let ClassifiedSelector::Pseudo { base, .. } = entry {
                let selector = entry.text();
                if !self.whitelist.protects(&selector) && !base_used(oracle, base).await {
                    self.remove(SelectorCategory::Pseudo, &selector);
                }
            }
        }

        for entry in classified.of(SelectorCategory::EscapedPseudo) {
            if let ClassifiedSelector::EscapedPseudo(selector) = entry
                && !self.whitelist.protects(selector)
                && !universe.literal_used(selector).await
            {
                self.remove(SelectorCategory::EscapedPseudo, selector);
            }
        }

        self.remove_unused_keyframes(classified);
    }

    async fn remove_unused_groups<O: PresenceOracle>(
        &mut self,
        classified: &ClassifiedSelectors,
        oracle: &O,
        universe: &mut Universe<'_, O>,
    ) {
        for entry in classified.of(SelectorCategory::CommaGroup) {
            let ClassifiedSelector::CommaGroup { text, branches, .. } = entry else {
                continue;
            };
            if self.whitelist.protects_group(text, branches) {
                continue;
            }
            let mut is_used = false;
            for branch in branches {
                if branch_used(oracle, universe, branch).await {
                    is_used = true;
                    break;
                }
            }
            if !is_used {
                self.remove(SelectorCategory::CommaGroup, text);
            }
        }
    }

    /// Delete keyframes no surviving `animation*` declaration refers to.
    pub fn remove_unused_keyframes(&mut self, classified: &ClassifiedSelectors) {
        for entry in classified.of(SelectorCategory::Keyframes) {
            let ClassifiedSelector::Keyframe { name, .. } = entry else {
                continue;
            };
            if self.whitelist.protects_keyframes(name) || self.sheet.references_animation(name) {
                continue;
            }
            if self.sheet.remove_keyframes(name) > 0 {
                log::debug!("removed unused keyframes `{name}`");
                self.stats.record(SelectorCategory::Keyframes, &entry.text());
            }
        }
    }

    /// Drop conditional groups emptied by earlier passes.
    pub fn prune_empty_groups(&mut self) -> usize {
        self.sheet.prune_empty_groups()
    }

    pub fn finish(self) -> RemovalStats {
        self.stats
    }
}

/// Decide one comma-group branch the way a standalone selector would be decided.
async fn branch_used<O: PresenceOracle>(oracle: &O, universe: &mut Universe<'_, O>, branch: &str) -> bool {
    match classify_selector(branch) {
        ClassifiedSelector::Simple(selector) | ClassifiedSelector::AmpElement(selector) => {
            matches_any(oracle, &selector).await
        }
        ClassifiedSelector::Pseudo { base, .. } => base_used(oracle, &base).await,
        ClassifiedSelector::EscapedPseudo(selector) => universe.literal_used(&selector).await,
        ClassifiedSelector::Polyfill(_)
        | ClassifiedSelector::CommaGroup { .. }
        | ClassifiedSelector::Keyframe { .. } => true,
    }
}
