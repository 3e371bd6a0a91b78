//! HTTP client for the MeSH RDF service
//!
//! Two read-only endpoints are used: the per-descriptor JSON document
//! (`GET {base}/{id}.json`) and the SPARQL endpoint, queried for the label
//! of the descriptor sitting at an exact tree number. The [`VocabularyClient`]
//! trait is the seam the resolver and classifier are written against, so
//! tests can substitute an in-memory vocabulary.

use crate::error::{LookupError, NotFoundReason, Result};
use crate::extract::first_binding_label;
use crate::identifier::ConceptIdentifier;
use crate::throttle::RequestThrottle;
use async_trait::async_trait;
use mesh_vocab::{meshv, rdfs, service};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Read access to the remote vocabulary
#[async_trait]
pub trait VocabularyClient: Debug + Send + Sync {
    /// Fetch the raw descriptor document for an identifier.
    ///
    /// A 404 is reported as `NotFound(UnknownIdentifier)`.
    async fn fetch_descriptor(&self, id: &ConceptIdentifier) -> Result<Value>;

    /// Label of the descriptor whose tree number is exactly `tree_number`.
    ///
    /// `Ok(None)` means the query succeeded and matched nothing.
    async fn descriptor_label_at(&self, tree_number: &str) -> Result<Option<String>>;
}

/// Connection settings for [`HttpVocabularyClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Descriptor base URL, e.g. `https://id.nlm.nih.gov/mesh`
    pub base_url: String,
    /// SPARQL endpoint; defaults to `{base_url}/sparql`
    pub sparql_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between any two requests
    pub request_spacing: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: service::BASE_URL.to_string(),
            sparql_url: None,
            timeout: Duration::from_secs(10),
            request_spacing: Duration::from_millis(200),
        }
    }
}

/// HTTP-based vocabulary client
#[derive(Clone)]
pub struct HttpVocabularyClient {
    client: Client,
    base_url: String,
    sparql_url: String,
    throttle: Arc<RequestThrottle>,
}

impl Debug for HttpVocabularyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpVocabularyClient")
            .field("base_url", &self.base_url)
            .field("sparql_url", &self.sparql_url)
            .field("spacing", &self.throttle.spacing())
            .finish()
    }
}

impl HttpVocabularyClient {
    /// Create a new client. Trailing slashes on the URLs are stripped.
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("mesh-enrich/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let sparql_url = match &config.sparql_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}/{}", base_url, service::SPARQL_PATH),
        };

        Ok(Self {
            client,
            base_url,
            sparql_url,
            throttle: Arc::new(RequestThrottle::new(config.request_spacing)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sparql_url(&self) -> &str {
        &self.sparql_url
    }

    fn descriptor_url(&self, id: &ConceptIdentifier) -> String {
        format!(
            "{}/{}.json",
            self.base_url,
            urlencoding::encode(id.as_str())
        )
    }
}

/// SPARQL text selecting the label of the descriptor at `tree_number`.
pub fn tree_label_query(tree_number: &str) -> String {
    format!(
        "PREFIX rdfs: <{rdfs_ns}>\n\
         PREFIX meshv: <{meshv_ns}>\n\
         PREFIX mesh: <{mesh_ns}>\n\
         \n\
         SELECT ?label\n\
         FROM <{graph}>\n\
         \n\
         WHERE {{\n  \
           ?descriptor meshv:treeNumber mesh:{tree_number} .\n  \
           ?descriptor rdfs:label ?label\n\
         }}",
        rdfs_ns = rdfs::NS,
        meshv_ns = meshv::NS,
        mesh_ns = meshv::MESH_NS,
        graph = service::MESH_GRAPH,
    )
}

/// Tree numbers are letters, digits and dots; anything else would change
/// the meaning of the SPARQL text it is spliced into.
fn is_tree_number(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.')
}

#[async_trait]
impl VocabularyClient for HttpVocabularyClient {
    async fn fetch_descriptor(&self, id: &ConceptIdentifier) -> Result<Value> {
        let url = self.descriptor_url(id);
        self.throttle.acquire().await;

        debug!(url = %url, "fetching descriptor");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::from_transport(id.as_str(), e))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(LookupError::NotFound {
                id: id.to_string(),
                reason: NotFoundReason::UnknownIdentifier,
            }),
            s if s.is_success() => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| LookupError::from_transport(id.as_str(), e))?;
                serde_json::from_str(&body).map_err(|e| LookupError::Malformed {
                    id: id.to_string(),
                    detail: e.to_string(),
                })
            }
            s => Err(LookupError::Status {
                id: id.to_string(),
                status: s.as_u16(),
            }),
        }
    }

    async fn descriptor_label_at(&self, tree_number: &str) -> Result<Option<String>> {
        if !is_tree_number(tree_number) {
            return Err(LookupError::Malformed {
                id: tree_number.to_string(),
                detail: "not a tree number".to_string(),
            });
        }
        let query = tree_label_query(tree_number);
        self.throttle.acquire().await;

        debug!(tree_number, "querying tree descriptor label");
        trace!(query = %query, "sparql");
        let resp = self
            .client
            .get(&self.sparql_url)
            .query(&[
                ("query", query.as_str()),
                ("format", "JSON"),
                ("limit", "1"),
                ("inference", "true"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::from_transport(tree_number, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                id: tree_number.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| LookupError::from_transport(tree_number, e))?;
        let doc: Value = serde_json::from_str(&body).map_err(|e| LookupError::Malformed {
            id: tree_number.to_string(),
            detail: e.to_string(),
        })?;
        Ok(first_binding_label(&doc))
    }
}
