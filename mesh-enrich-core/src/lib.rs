//! Enrichment engine for MeSH concept identifiers
//!
//! Given a table row carrying a `MESH:`-prefixed identifier, this crate
//! resolves the concept against the NLM MeSH RDF service and derives its
//! hierarchical placement: label, tree numbers, top-level codes and their
//! labels (or, alternatively, its broad `A`..`Z` categories).
//!
//! # Architecture
//!
//! - [`identifier`]: Prefix check and normalization of raw cell values
//! - [`client`]: Vocabulary client trait and its HTTP implementation
//! - [`throttle`]: Minimum spacing between outbound requests
//! - [`extract`]: Field extraction from descriptor and SPARQL documents
//! - [`resolver`]: Label and tree numbers, with `preferredMappedTo` fallback
//! - [`classifier`]: Top-level codes, their labels and broad categories
//! - [`cache`]: Bounded top-level label cache
//! - [`enricher`]: Per-row orchestration and ordered concurrent processing
//! - [`stats`]: Run counters and the summary report
//! - [`error`]: Lookup error taxonomy
//!
//! Row-level failures never abort a run; they surface as a
//! [`Diagnostic`] attached to the row.

pub mod cache;
pub mod classifier;
pub mod client;
pub mod enricher;
pub mod error;
pub mod extract;
pub mod identifier;
pub mod resolver;
pub mod stats;
pub mod throttle;

pub use cache::TopLevelLabelCache;
pub use classifier::{HierarchyClassifier, TopLevelClassification};
pub use client::{ClientConfig, HttpVocabularyClient, VocabularyClient};
pub use enricher::{
    Diagnostic, DiagnosticKind, EnrichedRow, Enrichment, OutputShape, RowEnricher, SourceRow,
};
pub use error::{LookupError, NotFoundReason, Result};
pub use identifier::ConceptIdentifier;
pub use resolver::{ConceptRecord, ConceptResolver};
pub use stats::{EnrichmentStats, Summary};
pub use throttle::RequestThrottle;
