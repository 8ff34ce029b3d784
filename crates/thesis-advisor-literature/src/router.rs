use serde::Serialize;
use thesis_advisor_agent::Agent;
use tracing::{debug, info, warn};

use crate::{ConnectorKind, Library, LiteratureError, ReferenceRecord};

/// Connector used whenever classification is unusable
const FALLBACK: ConnectorKind = ConnectorKind::Scholar;

const ROUTER_INSTRUCTION: &str = r#"You are the routing step of a thesis advisor. Classify the user's thesis idea by research domain.

- BIOMEDICAL: medicine, biology, clinical research, diseases, public health, life sciences.
- GENERAL: every other academic field (history, business, social science, engineering, computing, humanities).

Do not answer or discuss the thesis. Reply with exactly one word: BIOMEDICAL or GENERAL."#;

/// Outcome of classifying a thesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub connector: ConnectorKind,
    /// True when the classifier failed or was ambiguous
    pub fallback: bool,
    /// Why the fallback was taken
    pub reason: Option<String>,
}

impl RouteDecision {
    fn classified(connector: ConnectorKind) -> Self {
        Self {
            connector,
            fallback: false,
            reason: None,
        }
    }

    fn fallback(reason: impl Into<String>) -> Self {
        Self {
            connector: FALLBACK,
            fallback: true,
            reason: Some(reason.into()),
        }
    }
}

/// References found for a thesis by the routed connector
#[derive(Debug, Clone, Serialize)]
pub struct RoutedSearch {
    pub decision: RouteDecision,
    pub records: Vec<ReferenceRecord>,
}

/// Sends a thesis to exactly one connector, chosen by one classification call
pub struct Router<'a> {
    agent: &'a dyn Agent,
    library: &'a Library,
}

impl<'a> Router<'a> {
    pub fn new(agent: &'a dyn Agent, library: &'a Library) -> Self {
        Self { agent, library }
    }

    /// Classify the thesis. Never fails: errors and ambiguous answers fall
    /// back to the general-academic connector.
    pub async fn classify(&self, thesis: &str) -> RouteDecision {
        if thesis.trim().is_empty() {
            return RouteDecision::fallback("empty thesis");
        }

        match self.agent.complete(ROUTER_INSTRUCTION, thesis.trim()).await {
            Ok(output) => match parse_label(&output.text) {
                Some(kind) => {
                    debug!(connector = %kind, "Thesis classified");
                    RouteDecision::classified(kind)
                }
                None => {
                    warn!(answer = %output.text.trim(), "Ambiguous thesis classification");
                    RouteDecision::fallback(format!(
                        "ambiguous classification: {}",
                        output.text.trim()
                    ))
                }
            },
            Err(e) => {
                warn!(error = %e, "Thesis classification failed");
                RouteDecision::fallback(format!("classification failed: {}", e))
            }
        }
    }

    /// Classify, then search the chosen connector with the thesis text
    pub async fn route(&self, thesis: &str) -> Result<RoutedSearch, LiteratureError> {
        let decision = self.classify(thesis).await;
        info!(
            connector = %decision.connector,
            fallback = decision.fallback,
            "Routing thesis"
        );

        let records = self
            .library
            .search(decision.connector, thesis.trim())
            .await?;
        Ok(RoutedSearch { decision, records })
    }
}

/// Exactly one of the two labels must appear
fn parse_label(answer: &str) -> Option<ConnectorKind> {
    let upper = answer.to_uppercase();
    let bio = upper.contains("BIOMEDICAL");
    let general = upper.contains("GENERAL");
    match (bio, general) {
        (true, false) => Some(ConnectorKind::PubMed),
        (false, true) => Some(ConnectorKind::Scholar),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("BIOMEDICAL"), Some(ConnectorKind::PubMed));
        assert_eq!(parse_label("  general\n"), Some(ConnectorKind::Scholar));
        assert_eq!(parse_label("Biomedical or general"), None);
        assert_eq!(parse_label("I cannot tell"), None);
    }
}
