use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Connector, ConnectorKind, LiteratureError, ReferenceRecord, MAX_RESULTS};

pub const DEFAULT_PUBMED_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

const ARTICLE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";
const TOOL_NAME: &str = "thesis-advisor";

/// Optional NCBI etiquette parameters
#[derive(Debug, Clone, Default)]
pub struct PubMedOptions {
    pub api_key: Option<String>,
    pub email: Option<String>,
}

/// Biomedical connector backed by NCBI E-utilities (esearch + esummary)
pub struct PubMedConnector {
    options: PubMedOptions,
    base_url: String,
    client: reqwest::Client,
}

impl PubMedConnector {
    pub fn new(options: PubMedOptions) -> Self {
        Self {
            options,
            base_url: DEFAULT_PUBMED_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn retrieval(message: impl Into<String>) -> LiteratureError {
        LiteratureError::retrieval(ConnectorKind::PubMed, message)
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("tool", TOOL_NAME.to_string()),
        ];
        if let Some(key) = self.options.api_key.as_ref().filter(|k| !k.is_empty()) {
            params.push(("api_key", key.clone()));
        }
        if let Some(email) = self.options.email.as_ref().filter(|e| !e.is_empty()) {
            params.push(("email", email.clone()));
        }
        params
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, LiteratureError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .send()
            .await
            .map_err(|e| Self::retrieval(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::retrieval(format!(
                "{} returned HTTP {}",
                endpoint,
                status.as_u16()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Self::retrieval(format!("{} response: {}", endpoint, e)))
    }

    async fn search_ids(&self, query: &str) -> Result<Vec<String>, LiteratureError> {
        let mut params = self.common_params();
        params.push(("term", query.to_string()));
        params.push(("retmax", MAX_RESULTS.to_string()));
        params.push(("sort", "relevance".to_string()));

        let body: ESearchResponse = self.get_json("esearch.fcgi", &params).await?;
        if let Some(error) = body.esearchresult.error {
            return Err(Self::retrieval(error));
        }
        Ok(body.esearchresult.idlist)
    }

    async fn summaries(&self, ids: &[String]) -> Result<Vec<ReferenceRecord>, LiteratureError> {
        let mut params = self.common_params();
        params.push(("id", ids.join(",")));

        let body: ESummaryResponse = self.get_json("esummary.fcgi", &params).await?;

        // esearch order is the relevance order; esummary keys are not.
        let records = ids
            .iter()
            .filter_map(|id| body.result.get(id))
            .filter_map(|value| serde_json::from_value::<DocSummary>(value.clone()).ok())
            .map(ReferenceRecord::from)
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl Connector for PubMedConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::PubMed
    }

    async fn search(&self, query: &str) -> Result<Vec<ReferenceRecord>, LiteratureError> {
        info!(query, "Searching PubMed");

        let mut ids = self.search_ids(query).await?;
        ids.truncate(MAX_RESULTS);
        if ids.is_empty() {
            return Err(LiteratureError::no_results(ConnectorKind::PubMed, query));
        }

        let records = self.summaries(&ids).await?;
        debug!(count = records.len(), "PubMed results");
        if records.is_empty() {
            return Err(LiteratureError::no_results(ConnectorKind::PubMed, query));
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESummaryResponse {
    #[serde(default)]
    result: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DocSummary {
    uid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<DocAuthor>,
    #[serde(default)]
    fulljournalname: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    pubdate: String,
}

#[derive(Debug, Deserialize)]
struct DocAuthor {
    name: String,
}

impl From<DocSummary> for ReferenceRecord {
    fn from(doc: DocSummary) -> Self {
        let author = doc
            .authors
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", ");
        let journal = if doc.fulljournalname.is_empty() {
            doc.source
        } else {
            doc.fulljournalname
        };
        let snippet = match (journal.is_empty(), doc.pubdate.is_empty()) {
            (false, false) => format!("{}, {}", journal, doc.pubdate),
            (false, true) => journal,
            (true, false) => doc.pubdate,
            (true, true) => String::new(),
        };
        let link = format!("{}/{}/", ARTICLE_URL, doc.uid);

        ReferenceRecord::new(doc.title, author, snippet, link)
    }
}
