//! Concept resolution: label and tree numbers for one identifier
//!
//! Supplementary concepts and retired descriptors often carry no tree
//! numbers of their own, only a `preferredMappedTo` pointer to the
//! descriptor(s) that replaced them. When the primary document has no tree
//! numbers the resolver tries each target in order, one level deep: a
//! target's own redirects are not followed.

use crate::client::VocabularyClient;
use crate::error::{LookupError, NotFoundReason, Result};
use crate::extract::{descriptor_fields, DescriptorFields};
use crate::identifier::ConceptIdentifier;
use std::sync::Arc;
use tracing::debug;

/// Resolved data for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptRecord {
    pub identifier: ConceptIdentifier,
    /// Label of the descriptor the tree numbers belong to: the redirect
    /// target's label when one was followed and has a label, otherwise the
    /// concept's own label.
    pub label: String,
    /// The concept's own label, as returned for `identifier`
    pub concept_label: String,
    /// Bare tree numbers, in response order; never empty
    pub positions: Vec<String>,
    /// The `preferredMappedTo` target the positions came from
    pub redirect_target: Option<ConceptIdentifier>,
}

impl ConceptRecord {
    pub fn was_redirected(&self) -> bool {
        self.redirect_target.is_some()
    }
}

/// Resolves identifiers against a [`VocabularyClient`].
#[derive(Debug, Clone)]
pub struct ConceptResolver {
    client: Arc<dyn VocabularyClient>,
}

impl ConceptResolver {
    pub fn new(client: Arc<dyn VocabularyClient>) -> Self {
        Self { client }
    }

    /// Resolve `id` to its label and tree numbers.
    ///
    /// Fails with `NotFound` when the identifier is unknown, has no label, or
    /// has no tree numbers even after checking `preferredMappedTo`; with a
    /// status/timeout/network error when the primary fetch is unavailable;
    /// and with `Malformed` when the primary document cannot be read.
    pub async fn resolve(&self, id: &ConceptIdentifier) -> Result<ConceptRecord> {
        let doc = self.client.fetch_descriptor(id).await?;
        let fields = descriptor_fields(&doc).map_err(|detail| LookupError::Malformed {
            id: id.to_string(),
            detail,
        })?;

        let DescriptorFields {
            label,
            tree_numbers,
            mapped_to,
        } = fields;
        let Some(concept_label) = label else {
            return Err(LookupError::NotFound {
                id: id.to_string(),
                reason: NotFoundReason::NoLabel,
            });
        };

        if !tree_numbers.is_empty() {
            return Ok(ConceptRecord {
                identifier: id.clone(),
                label: concept_label.clone(),
                concept_label,
                positions: tree_numbers,
                redirect_target: None,
            });
        }

        debug!(id = %id, targets = mapped_to.len(), "no tree numbers, checking preferredMappedTo");
        for target in &mapped_to {
            if let Some((positions, target_label)) = self.lookup_target(target).await {
                debug!(id = %id, target = %target, "using tree numbers from mapped concept");
                return Ok(ConceptRecord {
                    identifier: id.clone(),
                    label: target_label.unwrap_or_else(|| concept_label.clone()),
                    concept_label,
                    positions,
                    redirect_target: Some(target.clone()),
                });
            }
        }

        Err(LookupError::NotFound {
            id: id.to_string(),
            reason: NotFoundReason::NoTreeNumbers,
        })
    }

    /// Single-level lookup of a redirect target. Any failure skips the target.
    async fn lookup_target(
        &self,
        target: &ConceptIdentifier,
    ) -> Option<(Vec<String>, Option<String>)> {
        let doc = match self.client.fetch_descriptor(target).await {
            Ok(doc) => doc,
            Err(e) => {
                debug!(target = %target, error = %e, "mapped concept lookup failed");
                return None;
            }
        };
        let fields = descriptor_fields(&doc).ok()?;
        if fields.tree_numbers.is_empty() {
            debug!(target = %target, "mapped concept has no tree numbers");
            return None;
        }
        Some((fields.tree_numbers, fields.label))
    }
}
