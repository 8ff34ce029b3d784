use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thesis_advisor_agent::{Agent, AgentError, AgentOutput, AgentRequest};
use thesis_advisor_literature::{
    Connector, ConnectorKind, Library, LiteratureError, ReferenceRecord, Router,
};

/// Agent that answers every call with a fixed reply (or error)
struct FixedAgent {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FixedAgent {
    fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err("quota exceeded".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Agent for FixedAgent {
    fn name(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "fixed-model"
    }

    async fn generate(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        self.prompts.lock().unwrap().push(request.prompt());
        match &self.reply {
            Ok(text) => Ok(AgentOutput::new(
                text.clone(),
                "fixed-model".into(),
                Duration::ZERO,
            )),
            Err(e) => Err(AgentError::InvalidResponse(e.clone())),
        }
    }
}

/// Connector that counts invocations and returns canned records
struct CountingConnector {
    kind: ConnectorKind,
    calls: AtomicUsize,
    empty: bool,
}

impl CountingConnector {
    fn new(kind: ConnectorKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: AtomicUsize::new(0),
            empty: false,
        })
    }

    fn empty(kind: ConnectorKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: AtomicUsize::new(0),
            empty: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for CountingConnector {
    fn kind(&self) -> ConnectorKind {
        self.kind
    }

    async fn search(&self, query: &str) -> Result<Vec<ReferenceRecord>, LiteratureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.empty {
            return Err(LiteratureError::no_results(self.kind, query));
        }
        Ok(vec![ReferenceRecord::new(
            format!("{} paper", self.kind.id()),
            "Author",
            "Snippet",
            format!("https://{}.example/1", self.kind.id()),
        )])
    }
}

#[tokio::test]
async fn test_biomedical_thesis_uses_pubmed_only() {
    let pubmed = CountingConnector::new(ConnectorKind::PubMed);
    let scholar = CountingConnector::new(ConnectorKind::Scholar);
    let library = Library::new(pubmed.clone(), scholar.clone());
    let agent = FixedAgent::answering("BIOMEDICAL");

    let routed = Router::new(&agent, &library)
        .route("Ethical implications of human brain organoids")
        .await
        .unwrap();

    assert_eq!(routed.decision.connector, ConnectorKind::PubMed);
    assert!(!routed.decision.fallback);
    assert_eq!(routed.records[0].title, "pubmed paper");
    assert_eq!(pubmed.calls(), 1);
    assert_eq!(scholar.calls(), 0);
    assert_eq!(agent.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_general_thesis_uses_scholar_only() {
    let pubmed = CountingConnector::new(ConnectorKind::PubMed);
    let scholar = CountingConnector::new(ConnectorKind::Scholar);
    let library = Library::new(pubmed.clone(), scholar.clone());
    let agent = FixedAgent::answering("GENERAL");

    let routed = Router::new(&agent, &library)
        .route("Causes of the Italian Renaissance")
        .await
        .unwrap();

    assert_eq!(routed.decision.connector, ConnectorKind::Scholar);
    assert_eq!(pubmed.calls(), 0);
    assert_eq!(scholar.calls(), 1);
}

#[tokio::test]
async fn test_ambiguous_classification_falls_back_to_scholar() {
    let pubmed = CountingConnector::new(ConnectorKind::PubMed);
    let scholar = CountingConnector::new(ConnectorKind::Scholar);
    let library = Library::new(pubmed.clone(), scholar.clone());
    let agent = FixedAgent::answering("Could be BIOMEDICAL or GENERAL");

    let decision = Router::new(&agent, &library)
        .classify("Economics of hospital staffing")
        .await;

    assert_eq!(decision.connector, ConnectorKind::Scholar);
    assert!(decision.fallback);
}

#[tokio::test]
async fn test_failed_classification_falls_back_to_scholar() {
    let pubmed = CountingConnector::new(ConnectorKind::PubMed);
    let scholar = CountingConnector::new(ConnectorKind::Scholar);
    let library = Library::new(pubmed.clone(), scholar.clone());
    let agent = FixedAgent::failing();

    let routed = Router::new(&agent, &library)
        .route("Anything at all about urban planning")
        .await
        .unwrap();

    assert!(routed.decision.fallback);
    assert_eq!(routed.decision.connector, ConnectorKind::Scholar);
    assert_eq!(scholar.calls(), 1);
    assert_eq!(pubmed.calls(), 0);
}

#[tokio::test]
async fn test_no_results_propagates_distinctly() {
    let pubmed = CountingConnector::empty(ConnectorKind::PubMed);
    let scholar = CountingConnector::new(ConnectorKind::Scholar);
    let library = Library::new(pubmed.clone(), scholar.clone());
    let agent = FixedAgent::answering("BIOMEDICAL");

    let err = Router::new(&agent, &library)
        .route("A very obscure biomedical question")
        .await
        .unwrap_err();

    assert!(err.is_no_results());
    assert_eq!(scholar.calls(), 0);
}
