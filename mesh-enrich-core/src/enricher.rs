//! Per-row enrichment: validate → normalize → resolve → classify → columns
//!
//! [`RowEnricher::enrich`] never fails. Every failure becomes a
//! [`Diagnostic`] on the returned row and the enrichment columns are left
//! empty, so one bad identifier never aborts a run.

use crate::classifier::{HierarchyClassifier, TopLevelClassification};
use crate::error::{LookupError, NotFoundReason};
use crate::identifier::{has_required_prefix, normalize};
use crate::resolver::{ConceptRecord, ConceptResolver};
use futures::stream::{self, Stream, StreamExt};
use mesh_vocab::columns;
use std::fmt;
use std::str::FromStr;

/// Length of the message prefix used to group similar diagnostics.
pub const GROUPING_KEY_CHARS: usize = 50;

/// Row-local failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Missing, unprefixed or malformed identifier; no request was made
    InvalidIdentifier,
    /// Unknown identifier, or no usable label / tree numbers
    NotFound,
    /// Non-2xx other than 404, timeout, or transport failure
    Unavailable,
    /// Response body not in the expected structure
    Malformed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::InvalidIdentifier => "InvalidIdentifier",
            DiagnosticKind::NotFound => "NotFound",
            DiagnosticKind::Unavailable => "Unavailable",
            DiagnosticKind::Malformed => "Malformed",
        })
    }
}

/// Structured description of why a row was not enriched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Set for `NotFound`
    pub reason: Option<NotFoundReason>,
}

impl Diagnostic {
    pub fn invalid_identifier(message: String) -> Self {
        Self {
            kind: DiagnosticKind::InvalidIdentifier,
            message,
            reason: None,
        }
    }

    pub fn from_lookup(err: &LookupError) -> Self {
        let kind = match err {
            LookupError::NotFound { .. } => DiagnosticKind::NotFound,
            LookupError::Malformed { .. } => DiagnosticKind::Malformed,
            LookupError::Status { .. } | LookupError::Timeout { .. } | LookupError::Network { .. } => {
                DiagnosticKind::Unavailable
            }
        };
        Self {
            kind,
            message: err.to_string(),
            reason: err.not_found_reason(),
        }
    }

    /// First [`GROUPING_KEY_CHARS`] characters of the message, so that
    /// failures differing only in their identifier collapse together.
    pub fn grouping_key(&self) -> String {
        self.message.chars().take(GROUPING_KEY_CHARS).collect()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Which columns the enrichment appends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputShape {
    /// Label, tree numbers, per-tree labels, top-level codes and their labels
    #[default]
    Hierarchical,
    /// Broad category letters and their fixed labels
    Categories,
}

impl OutputShape {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            OutputShape::Hierarchical => &columns::HIERARCHICAL,
            OutputShape::Categories => &columns::CATEGORIES,
        }
    }
}

impl FromStr for OutputShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hierarchical" | "tree" => Ok(OutputShape::Hierarchical),
            "categories" | "category" => Ok(OutputShape::Categories),
            other => Err(format!(
                "unknown output shape '{other}' (expected 'hierarchical' or 'categories')"
            )),
        }
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputShape::Hierarchical => "hierarchical",
            OutputShape::Categories => "categories",
        })
    }
}

/// One input data row; `number` is 1-based and excludes the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub number: usize,
    pub values: Vec<String>,
}

/// Successful resolution of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub record: ConceptRecord,
    pub classifications: Vec<TopLevelClassification>,
}

impl Enrichment {
    /// One label per tree number. Every position of a record belongs to the
    /// same descriptor, so they all carry its label.
    pub fn tree_labels(&self) -> Vec<String> {
        vec![self.record.label.clone(); self.record.positions.len()]
    }

    pub fn top_level_codes(&self) -> Vec<&str> {
        self.classifications.iter().map(|c| c.code.as_str()).collect()
    }

    pub fn top_level_labels(&self) -> Vec<&str> {
        self.classifications.iter().map(|c| c.label.as_str()).collect()
    }
}

/// An input row with its enrichment outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRow {
    pub source: SourceRow,
    pub outcome: Result<Enrichment, Diagnostic>,
}

impl EnrichedRow {
    pub fn enrichment(&self) -> Option<&Enrichment> {
        self.outcome.as_ref().ok()
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.outcome.as_ref().err()
    }

    /// Cells appended for `shape`; all empty for a failed row.
    pub fn enrichment_columns(&self, shape: OutputShape) -> Vec<String> {
        let Some(e) = self.enrichment() else {
            return vec![String::new(); shape.columns().len()];
        };
        let sep = columns::LIST_SEPARATOR;
        match shape {
            OutputShape::Hierarchical => vec![
                e.record.concept_label.clone(),
                e.record.positions.join(sep),
                e.tree_labels().join(sep),
                e.top_level_codes().join(sep),
                e.top_level_labels().join(sep),
            ],
            OutputShape::Categories => {
                vec![e.top_level_codes().join(sep), e.top_level_labels().join(sep)]
            }
        }
    }

    /// Original cells followed by the enrichment cells.
    pub fn into_record(self, shape: OutputShape) -> Vec<String> {
        let extra = self.enrichment_columns(shape);
        let mut values = self.source.values;
        values.extend(extra);
        values
    }
}

/// Composition root for one row's enrichment.
#[derive(Debug, Clone)]
pub struct RowEnricher {
    resolver: ConceptResolver,
    classifier: HierarchyClassifier,
    shape: OutputShape,
}

impl RowEnricher {
    pub fn new(
        resolver: ConceptResolver,
        classifier: HierarchyClassifier,
        shape: OutputShape,
    ) -> Self {
        Self {
            resolver,
            classifier,
            shape,
        }
    }

    pub fn shape(&self) -> OutputShape {
        self.shape
    }

    pub fn classifier(&self) -> &HierarchyClassifier {
        &self.classifier
    }

    /// Enrich one row. `id_index` is the position of the identifier column,
    /// `None` when the header lacks it (every row is then diagnosed).
    pub async fn enrich(&self, row: SourceRow, id_index: Option<usize>) -> EnrichedRow {
        let outcome = self.resolve_row(&row, id_index).await;
        EnrichedRow {
            source: row,
            outcome,
        }
    }

    async fn resolve_row(
        &self,
        row: &SourceRow,
        id_index: Option<usize>,
    ) -> Result<Enrichment, Diagnostic> {
        let raw = id_index
            .and_then(|i| row.values.get(i))
            .map(String::as_str)
            .unwrap_or("");

        if !has_required_prefix(raw) {
            return Err(Diagnostic::invalid_identifier(format!(
                "Invalid or missing MeSH ID in row {}: {raw}",
                row.number
            )));
        }
        let id = normalize(raw);
        if !id.is_well_formed() {
            return Err(Diagnostic::invalid_identifier(format!(
                "Malformed MeSH ID in row {}: {raw}",
                row.number
            )));
        }

        let record = self
            .resolver
            .resolve(&id)
            .await
            .map_err(|e| match e {
                // name the unknown identifier as it appears in the input
                LookupError::NotFound {
                    reason: NotFoundReason::UnknownIdentifier,
                    ..
                } => Diagnostic::from_lookup(&LookupError::NotFound {
                    id: raw.trim().to_string(),
                    reason: NotFoundReason::UnknownIdentifier,
                }),
                e => Diagnostic::from_lookup(&e),
            })?;

        let classifications = match self.shape {
            OutputShape::Hierarchical => self.classifier.classify(&record).await,
            OutputShape::Categories => HierarchyClassifier::broad_categories(&record),
        };

        Ok(Enrichment {
            record,
            classifications,
        })
    }

    /// Enrich `rows` with up to `concurrency` rows in flight, yielding results
    /// in input order.
    ///
    /// Rows are pulled lazily, so dropping the stream (or an input iterator
    /// that ends early) stops new requests from being issued.
    pub fn enrich_ordered<'a, I>(
        &'a self,
        rows: I,
        id_index: Option<usize>,
        concurrency: usize,
    ) -> impl Stream<Item = EnrichedRow> + 'a
    where
        I: IntoIterator<Item = SourceRow>,
        I::IntoIter: 'a,
    {
        stream::iter(rows)
            .map(move |row| self.enrich(row, id_index))
            .buffered(concurrency.max(1))
    }
}
