//! MeSH Vocabulary Constants for the enrichment tools
//!
//! This crate provides a centralized location for the MeSH RDF service
//! endpoints, JSON-LD field names, vocabulary IRIs and output column names
//! used throughout the enrichment workspace.
//!
//! # Organization
//!
//! Constants are organized by concern:
//! - `service` - NLM MeSH RDF service endpoints and identifier prefix
//! - `fields` - JSON field names seen in descriptor responses
//! - `meshv` - MeSH vocabulary (http://id.nlm.nih.gov/mesh/vocab#)
//! - `rdfs` - the RDFS terms used by the SPARQL label query
//! - `columns` - output column names for each output shape
//! - `categories` - the fixed MeSH top-level category table

/// NLM MeSH RDF service constants
pub mod service {
    /// Base URL for descriptor lookups (`{BASE_URL}/{id}.json`)
    pub const BASE_URL: &str = "https://id.nlm.nih.gov/mesh";

    /// Path of the SPARQL endpoint relative to [`BASE_URL`]
    pub const SPARQL_PATH: &str = "sparql";

    /// Named graph holding the current MeSH release
    pub const MESH_GRAPH: &str = "http://id.nlm.nih.gov/mesh";

    /// Prefix carried by identifiers in the input column
    pub const ID_PREFIX: &str = "MESH:";
}

/// Field names in descriptor JSON responses
///
/// The service has returned several shapes over time, so each concept has
/// more than one candidate field. Lookups try them in the order listed.
pub mod fields {
    /// Plain label field
    pub const LABEL: &str = "label";

    /// Alternate label field used by older responses
    pub const NAME: &str = "name";

    /// JSON-LD default graph wrapper
    pub const GRAPH: &str = "@graph";

    /// JSON-LD literal value inside a localized label object
    pub const VALUE: &str = "@value";

    /// JSON-LD node reference inside an IRI object
    pub const ID: &str = "@id";

    /// English-keyed label variant (`{"en": "..."}`)
    pub const LANG_EN: &str = "en";

    /// Singular tree number field
    pub const TREE_NUMBER: &str = "treeNumber";

    /// Plural tree number field
    pub const TREE_NUMBERS: &str = "treeNumbers";

    /// Redirect from a supplementary concept to the descriptor(s) it maps to
    pub const PREFERRED_MAPPED_TO: &str = "preferredMappedTo";

    /// Label candidates, in priority order
    pub const LABEL_FIELDS: [&str; 2] = [LABEL, NAME];

    /// Tree number candidates at the top level of a response, in priority order
    pub const TREE_NUMBER_FIELDS: [&str; 2] = [TREE_NUMBER, TREE_NUMBERS];
}

/// MeSH vocabulary constants
pub mod meshv {
    /// meshv: namespace IRI
    pub const NS: &str = "http://id.nlm.nih.gov/mesh/vocab#";

    /// mesh: namespace IRI (descriptors and tree numbers)
    pub const MESH_NS: &str = "http://id.nlm.nih.gov/mesh/";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs: namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
}

/// Output column names
pub mod columns {
    /// Default input column carrying the prefixed identifier
    pub const DEFAULT_ID_COLUMN: &str = "CTD-ASSIGNED CONCEPT ID";

    /// Separator for list-valued output cells
    pub const LIST_SEPARATOR: &str = ";";

    pub const MESH_LABEL: &str = "MESH_LABEL";
    pub const MESH_TREE_NUMBERS: &str = "MESH_TREE_NUMBERS";
    pub const MESH_TREE_LABELS: &str = "MESH_TREE_LABELS";
    pub const MESH_TREE_TOP_CODES: &str = "MESH_TREE_TOP_CODES";
    pub const MESH_TREE_TOP_LABELS: &str = "MESH_TREE_TOP_LABELS";

    pub const MESH_TOP_LEVEL_CODES: &str = "MESH_TOP_LEVEL_CODES";
    pub const MESH_TOP_LEVEL_LABELS: &str = "MESH_TOP_LEVEL_LABELS";

    /// Columns appended by the hierarchical output shape
    pub const HIERARCHICAL: [&str; 5] = [
        MESH_LABEL,
        MESH_TREE_NUMBERS,
        MESH_TREE_LABELS,
        MESH_TREE_TOP_CODES,
        MESH_TREE_TOP_LABELS,
    ];

    /// Columns appended by the category output shape
    pub const CATEGORIES: [&str; 2] = [MESH_TOP_LEVEL_CODES, MESH_TOP_LEVEL_LABELS];
}

/// MeSH top-level categories, keyed by the first letter of a tree number
pub mod categories {
    /// (letter, label) pairs in tree order
    pub const TABLE: [(char, &str); 16] = [
        ('A', "Anatomy"),
        ('B', "Organisms"),
        ('C', "Diseases"),
        ('D', "Chemicals and Drugs"),
        (
            'E',
            "Analytical, Diagnostic and Therapeutic Techniques, and Equipment",
        ),
        ('F', "Psychiatry and Psychology"),
        ('G', "Phenomena and Processes"),
        ('H', "Disciplines and Occupations"),
        (
            'I',
            "Anthropology, Education, Sociology, and Social Phenomena",
        ),
        ('J', "Technology, Industry, and Agriculture"),
        ('K', "Humanities"),
        ('L', "Information Science"),
        ('M', "Named Groups"),
        ('N', "Health Care"),
        ('V', "Publication Characteristics"),
        ('Z', "Geographicals"),
    ];

    /// Look up the category label for a tree-number letter.
    #[inline]
    pub fn label(letter: char) -> Option<&'static str> {
        TABLE
            .iter()
            .find(|(code, _)| *code == letter)
            .map(|(_, label)| *label)
    }
}
