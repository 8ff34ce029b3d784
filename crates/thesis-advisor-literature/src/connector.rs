use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::ReferenceRecord;

/// Upper bound on records returned by any connector
pub const MAX_RESULTS: usize = 5;

/// Errors from a literature search. Callers present the two cases differently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteratureError {
    /// Network, authentication or quota failure
    #[error("{connector} search failed: {message}")]
    Retrieval {
        connector: ConnectorKind,
        message: String,
    },

    /// The service answered, but with nothing
    #[error("{connector} returned no results for \"{query}\"")]
    NoResults {
        connector: ConnectorKind,
        query: String,
    },
}

impl LiteratureError {
    pub fn retrieval(connector: ConnectorKind, message: impl Into<String>) -> Self {
        Self::Retrieval {
            connector,
            message: message.into(),
        }
    }

    pub fn no_results(connector: ConnectorKind, query: impl Into<String>) -> Self {
        Self::NoResults {
            connector,
            query: query.into(),
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults { .. })
    }
}

/// The two connector variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Biomedical literature (PubMed)
    PubMed,
    /// General academic literature (Google Scholar)
    Scholar,
}

impl ConnectorKind {
    pub const ALL: [ConnectorKind; 2] = [ConnectorKind::PubMed, ConnectorKind::Scholar];

    /// Identifier used in tool arguments and config
    pub fn id(&self) -> &'static str {
        match self {
            ConnectorKind::PubMed => "pubmed",
            ConnectorKind::Scholar => "scholar",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConnectorKind::PubMed => {
                "Biomedical, clinical, health and life-science research papers"
            }
            ConnectorKind::Scholar => {
                "General academic papers: humanities, social science, engineering, business"
            }
        }
    }
}

impl std::fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorKind::PubMed => write!(f, "PubMed"),
            ConnectorKind::Scholar => write!(f, "Google Scholar"),
        }
    }
}

impl std::str::FromStr for ConnectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pubmed" | "pub_med" | "biomedical" => Ok(ConnectorKind::PubMed),
            "scholar" | "google_scholar" | "google-scholar" | "general" => {
                Ok(ConnectorKind::Scholar)
            }
            _ => Err(format!("Unknown literature source: {}", s)),
        }
    }
}

/// A literature search service. Every call is a fresh network request.
#[async_trait]
pub trait Connector: Send + Sync {
    fn kind(&self) -> ConnectorKind;

    /// Search for `query`. Returns 1..=[`MAX_RESULTS`] records in the
    /// provider's relevance order.
    async fn search(&self, query: &str) -> Result<Vec<ReferenceRecord>, LiteratureError>;
}

/// Both connectors, addressed by kind
#[derive(Clone)]
pub struct Library {
    pubmed: Arc<dyn Connector>,
    scholar: Arc<dyn Connector>,
}

impl Library {
    pub fn new(pubmed: Arc<dyn Connector>, scholar: Arc<dyn Connector>) -> Self {
        Self { pubmed, scholar }
    }

    pub fn get(&self, kind: ConnectorKind) -> &dyn Connector {
        match kind {
            ConnectorKind::PubMed => self.pubmed.as_ref(),
            ConnectorKind::Scholar => self.scholar.as_ref(),
        }
    }

    pub async fn search(
        &self,
        kind: ConnectorKind,
        query: &str,
    ) -> Result<Vec<ReferenceRecord>, LiteratureError> {
        self.get(kind).search(query).await
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("pubmed", &self.pubmed.kind())
            .field("scholar", &self.scholar.kind())
            .finish()
    }
}
