//! Run statistics and the end-of-run summary

use crate::enricher::{DiagnosticKind, EnrichedRow};
use crate::error::NotFoundReason;
use std::collections::HashMap;
use std::fmt;

/// Number of distinct diagnostic groups shown in the summary.
pub const TOP_MESSAGES: usize = 10;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub invalid_identifiers: usize,
    pub not_found: usize,
    pub unavailable: usize,
    pub malformed: usize,
    /// Concepts with no tree numbers, directly or through a redirect
    pub without_tree_numbers: usize,
    /// Concepts whose tree numbers came from `preferredMappedTo`
    pub using_mapped: usize,
    messages: HashMap<String, usize>,
}

impl EnrichmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, row: &EnrichedRow) {
        self.total += 1;
        match &row.outcome {
            Ok(enrichment) => {
                self.successful += 1;
                if enrichment.record.was_redirected() {
                    self.using_mapped += 1;
                }
            }
            Err(diag) => {
                self.errors += 1;
                match diag.kind {
                    DiagnosticKind::InvalidIdentifier => self.invalid_identifiers += 1,
                    DiagnosticKind::NotFound => self.not_found += 1,
                    DiagnosticKind::Unavailable => self.unavailable += 1,
                    DiagnosticKind::Malformed => self.malformed += 1,
                }
                if diag.reason == Some(NotFoundReason::NoTreeNumbers) {
                    self.without_tree_numbers += 1;
                }
                *self.messages.entry(diag.grouping_key()).or_default() += 1;
            }
        }
    }

    /// The `n` most frequent diagnostic groups, by count descending and then
    /// by message.
    pub fn top_messages(&self, n: usize) -> Vec<(&str, usize)> {
        let mut groups: Vec<(&str, usize)> = self
            .messages
            .iter()
            .map(|(msg, count)| (msg.as_str(), *count))
            .collect();
        groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        groups.truncate(n);
        groups
    }

    /// Summary lines for display, ending with the error groups if any.
    pub fn summary(&self, output: &str) -> Summary<'_> {
        Summary {
            stats: self,
            output: output.to_string(),
        }
    }
}

/// Renders an [`EnrichmentStats`] as the end-of-run report.
#[derive(Debug)]
pub struct Summary<'a> {
    stats: &'a EnrichmentStats,
    output: String,
}

impl Summary<'_> {
    pub fn lines(&self) -> Vec<String> {
        let s = self.stats;
        let mut lines = vec![
            "Processing complete!".to_string(),
            format!("Total rows processed: {}", s.total),
            format!("Successful enrichments: {}", s.successful),
            format!("Errors: {}", s.errors),
            format!("  Invalid identifiers: {}", s.invalid_identifiers),
            format!("  Not found: {}", s.not_found),
            format!("  Unavailable: {}", s.unavailable),
            format!("  Malformed responses: {}", s.malformed),
            format!("Concepts without tree numbers: {}", s.without_tree_numbers),
            format!("Concepts using preferredMappedTo: {}", s.using_mapped),
            format!("Output saved to: {}", self.output),
        ];
        if s.errors > 0 {
            lines.push(format!("Error summary (top {TOP_MESSAGES}):"));
            for (msg, count) in s.top_messages(TOP_MESSAGES) {
                lines.push(format!("  {count}x: {msg}"));
            }
        }
        lines
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
