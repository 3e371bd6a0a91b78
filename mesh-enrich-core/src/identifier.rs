//! Identifier normalization

use mesh_vocab::service::ID_PREFIX;
use std::fmt;

/// A normalized MeSH identifier (`D015059`, `C471568`), prefix and
/// surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConceptIdentifier(String);

impl ConceptIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty and made only of ASCII letters and digits.
    ///
    /// The identifier is interpolated into a URL path, so anything else is
    /// rejected before a request is built.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl fmt::Display for ConceptIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConceptIdentifier {
    fn from(value: &str) -> Self {
        normalize(value)
    }
}

/// Strip the `MESH:` prefix and surrounding whitespace. Never fails.
pub fn normalize(raw: &str) -> ConceptIdentifier {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix(ID_PREFIX).unwrap_or(trimmed);
    ConceptIdentifier(bare.trim().to_string())
}

/// Whether a raw cell value carries the required `MESH:` prefix.
pub fn has_required_prefix(raw: &str) -> bool {
    !raw.is_empty() && raw.starts_with(ID_PREFIX)
}

/// Reduce an IRI to its trailing path segment; bare values pass through.
///
/// `http://id.nlm.nih.gov/mesh/D04.345.566` → `D04.345.566`
pub fn trailing_segment(value: &str) -> &str {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        value
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(value)
    } else {
        value
    }
}
