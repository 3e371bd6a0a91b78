//! Error types for descriptor and tree-position lookups

use thiserror::Error;

/// Why a concept could not be resolved to usable data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The service answered 404 for the identifier
    UnknownIdentifier,
    /// The descriptor exists but carries no usable label
    NoLabel,
    /// Neither the descriptor nor any `preferredMappedTo` target has tree numbers
    NoTreeNumbers,
}

/// Errors from a single lookup against the vocabulary service
///
/// All variants are row-local: the enricher turns them into diagnostics and
/// processing continues with the next row.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Remote confirmed absence, or no usable label/tree numbers
    #[error("{}", not_found_message(id, *reason))]
    NotFound { id: String, reason: NotFoundReason },

    /// Non-2xx response other than 404
    #[error("API error (status {status}): {id}")]
    Status { id: String, status: u16 },

    /// Request exceeded the per-call timeout
    #[error("Timeout querying API for: {id}")]
    Timeout { id: String },

    /// Connection or other transport failure
    #[error("Network error for {id}: {detail}")]
    Network { id: String, detail: String },

    /// Response body is not the expected JSON structure
    #[error("Malformed response for {id}: {detail}")]
    Malformed { id: String, detail: String },
}

fn not_found_message(id: &str, reason: NotFoundReason) -> String {
    match reason {
        NotFoundReason::UnknownIdentifier => format!("MeSH ID not found: {id}"),
        NotFoundReason::NoLabel => format!("No label found for: {id}"),
        NotFoundReason::NoTreeNumbers => {
            format!("No tree numbers found for: {id} (even after checking preferredMappedTo)")
        }
    }
}

impl LookupError {
    /// Build a lookup error from a reqwest transport error.
    pub fn from_transport(id: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout { id: id.to_string() }
        } else if e.is_decode() {
            LookupError::Malformed {
                id: id.to_string(),
                detail: e.to_string(),
            }
        } else if e.is_connect() {
            LookupError::Network {
                id: id.to_string(),
                detail: format!("connection failed: {e}"),
            }
        } else {
            LookupError::Network {
                id: id.to_string(),
                detail: e.to_string(),
            }
        }
    }

    /// True for failures that say nothing about the concept itself
    /// (status, timeout, transport). These are never retried automatically.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LookupError::Status { .. } | LookupError::Timeout { .. } | LookupError::Network { .. }
        )
    }

    /// The not-found reason, if this is a not-found error.
    pub fn not_found_reason(&self) -> Option<NotFoundReason> {
        match self {
            LookupError::NotFound { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
