//! Top-level classification of resolved tree numbers

use crate::cache::TopLevelLabelCache;
use crate::client::VocabularyClient;
use crate::resolver::ConceptRecord;
use mesh_vocab::categories;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// A top-level tree code and the label of the descriptor at that position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelClassification {
    pub code: String,
    /// Empty when no distinct descriptor exists at the bare code
    pub label: String,
}

/// Segment before the first `.`, or the whole position.
pub fn top_level_code(position: &str) -> &str {
    match position.split_once('.') {
        Some((head, _)) => head,
        None => position,
    }
}

/// Distinct top-level codes of `positions`, in first-seen order.
pub fn top_level_codes<S: AsRef<str>>(positions: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    positions
        .iter()
        .map(|p| top_level_code(p.as_ref()))
        .filter(|code| seen.insert(*code))
        .map(str::to_string)
        .collect()
}

/// Derives top-level codes from a record and resolves their labels.
#[derive(Debug, Clone)]
pub struct HierarchyClassifier {
    client: Arc<dyn VocabularyClient>,
    cache: Arc<TopLevelLabelCache>,
}

impl HierarchyClassifier {
    pub fn new(client: Arc<dyn VocabularyClient>, cache: Arc<TopLevelLabelCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &TopLevelLabelCache {
        &self.cache
    }

    /// Classify every distinct top-level code of `record`. Never fails: a code
    /// whose label cannot be resolved gets an empty label.
    pub async fn classify(&self, record: &ConceptRecord) -> Vec<TopLevelClassification> {
        let mut out = Vec::new();
        for code in top_level_codes(&record.positions) {
            let label = self.top_level_label(&code).await.unwrap_or_default();
            out.push(TopLevelClassification { code, label });
        }
        out
    }

    /// Label of the descriptor sitting exactly at `code`, through the cache.
    ///
    /// Top-level codes are usually organizational headers rather than
    /// descriptors, so "no match" is the common answer. A label identical to
    /// the code itself is treated the same way. Query failures are logged and
    /// reported as no label, and are not cached.
    pub async fn top_level_label(&self, code: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(code) {
            trace!(code, "top-level label cache hit");
            return hit;
        }

        match self.client.descriptor_label_at(code).await {
            Ok(found) => {
                let label = found.filter(|l| !l.trim().is_empty() && l != code);
                if !self.cache.insert(code, label.clone()) {
                    debug!(code, capacity = self.cache.capacity(), "top-level label cache full");
                }
                label
            }
            Err(e) => {
                debug!(code, error = %e, "error looking up tree descriptor label");
                None
            }
        }
    }

    /// Broad MeSH categories (`A`..`Z`) of `record`: distinct first letters
    /// of its tree numbers, sorted, labelled from the fixed category table.
    /// Letters missing from the table are labelled `Unknown-{letter}`.
    pub fn broad_categories(record: &ConceptRecord) -> Vec<TopLevelClassification> {
        let letters: BTreeSet<char> = record
            .positions
            .iter()
            .filter_map(|p| p.chars().next())
            .collect();
        letters
            .into_iter()
            .map(|letter| TopLevelClassification {
                code: letter.to_string(),
                label: categories::label(letter)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Unknown-{letter}")),
            })
            .collect()
    }
}
