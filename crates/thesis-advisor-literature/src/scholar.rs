use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Connector, ConnectorKind, LiteratureError, ReferenceRecord, MAX_RESULTS};

pub const DEFAULT_SCHOLAR_URL: &str = "https://serpapi.com";

/// SerpApi's wording when Google Scholar found nothing
const EMPTY_MARKER: &str = "hasn't returned any results";

/// General-academic connector backed by SerpApi's Google Scholar engine
pub struct ScholarConnector {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl ScholarConnector {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn retrieval(message: impl Into<String>) -> LiteratureError {
        LiteratureError::retrieval(ConnectorKind::Scholar, message)
    }
}

#[async_trait]
impl Connector for ScholarConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Scholar
    }

    async fn search(&self, query: &str) -> Result<Vec<ReferenceRecord>, LiteratureError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(Self::retrieval("SERPAPI_API_KEY is not set")),
        };

        info!(query, "Searching Google Scholar");
        let num = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google_scholar"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| Self::retrieval(e.to_string()))?;

        let status = response.status();
        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| Self::retrieval(format!("HTTP {}: {}", status.as_u16(), e)))?;

        if let Some(error) = body.error {
            if error.contains(EMPTY_MARKER) {
                return Err(LiteratureError::no_results(ConnectorKind::Scholar, query));
            }
            return Err(Self::retrieval(error));
        }
        if !status.is_success() {
            return Err(Self::retrieval(format!("HTTP {}", status.as_u16())));
        }

        let records: Vec<ReferenceRecord> = body
            .organic_results
            .into_iter()
            .take(MAX_RESULTS)
            .map(ReferenceRecord::from)
            .collect();

        debug!(count = records.len(), "Google Scholar results");
        if records.is_empty() {
            return Err(LiteratureError::no_results(ConnectorKind::Scholar, query));
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    publication_info: Option<PublicationInfo>,
}

#[derive(Debug, Deserialize)]
struct PublicationInfo {
    summary: Option<String>,
    #[serde(default)]
    authors: Vec<SerpAuthor>,
}

#[derive(Debug, Deserialize)]
struct SerpAuthor {
    name: String,
}

impl From<OrganicResult> for ReferenceRecord {
    fn from(result: OrganicResult) -> Self {
        let author = result
            .publication_info
            .map(|info| match info.summary {
                Some(summary) => summary,
                None => info
                    .authors
                    .into_iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .unwrap_or_default();

        ReferenceRecord::new(result.title, author, result.snippet, result.link)
    }
}
