#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thesis_advisor_agent::{Agent, AgentError, AgentOutput, AgentRequest, ToolCall};
use thesis_advisor_core::{CriteriaSet, DebateBrief, Persona};
use thesis_advisor_literature::{Connector, ConnectorKind, Library, LiteratureError, ReferenceRecord};
use thesis_advisor_logging::{LogFormat, Logger};

pub const INITIAL_LINK: &str = "https://example.org/initial";

/// One inference call the scripted debater received
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub persona: Persona,
    pub round: u8,
    pub request: AgentRequest,
}

/// Debater double. Answers `"<PERSONA>-R<n>"`, identifying persona and round
/// from the request itself.
#[derive(Default)]
pub struct ScriptedDebater {
    /// Every attempt fails for these turns
    pub always_fail: HashSet<(Persona, u8)>,
    /// Only the first attempt fails for these turns
    pub fail_once: HashSet<(Persona, u8)>,
    /// Tool calls returned on the first call of these turns
    pub searches: HashMap<(Persona, u8), Vec<ToolCall>>,
    /// Return a tool call next to the text in every gated round
    pub rogue_tool_calls: bool,
    pub seen: Mutex<Vec<SeenCall>>,
}

impl ScriptedDebater {
    pub fn calls_for(&self, persona: Persona, round: u8) -> Vec<SeenCall> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.persona == persona && c.round == round)
            .cloned()
            .collect()
    }

    /// First request of a turn
    pub fn first_request(&self, persona: Persona, round: u8) -> AgentRequest {
        self.calls_for(persona, round)
            .into_iter()
            .next()
            .expect("turn was requested")
            .request
    }
}

pub fn persona_of(request: &AgentRequest) -> Persona {
    if request.system.starts_with("You are the PRO debater") {
        Persona::Pro
    } else {
        Persona::Con
    }
}

pub fn round_of(request: &AgentRequest) -> u8 {
    let prompt = request.prompt();
    let marker = "CURRENT ROUND: ";
    let start = prompt.find(marker).expect("round marker") + marker.len();
    prompt[start..start + 1].parse().expect("round digit")
}

pub fn search_call(source: &str, query: &str) -> ToolCall {
    ToolCall::new("search_literature", json!({"source": source, "query": query}))
}

#[async_trait]
impl Agent for ScriptedDebater {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let persona = persona_of(request);
        let round = round_of(request);
        let key = (persona, round);
        let attempt = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(SeenCall {
                persona,
                round,
                request: request.clone(),
            });
            seen.iter()
                .filter(|c| c.persona == persona && c.round == round)
                .count()
        };

        if self.always_fail.contains(&key) || (attempt == 1 && self.fail_once.contains(&key)) {
            return Err(AgentError::Status {
                status: 500,
                body: "scripted failure".into(),
            });
        }

        let text = format!("{}-R{}", persona, round);
        let output = AgentOutput::new(text, "scripted-model".into(), Duration::ZERO);

        if request.has_tools() {
            if let Some(calls) = self.searches.get(&key) {
                return Ok(AgentOutput::new(String::new(), "scripted-model".into(), Duration::ZERO)
                    .with_tool_calls(calls.clone()));
            }
        } else if self.rogue_tool_calls && request.messages.len() == 1 {
            return Ok(output.with_tool_calls(vec![search_call("scholar", "sneaky")]));
        }
        Ok(output)
    }
}

/// Connector double returning fixed records and counting queries
pub struct CountingConnector {
    kind: ConnectorKind,
    records: Vec<ReferenceRecord>,
    pub queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl CountingConnector {
    pub fn new(kind: ConnectorKind, records: Vec<ReferenceRecord>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            records,
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
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
        self.queries.lock().unwrap().push(query.to_string());
        if self.records.is_empty() {
            return Err(LiteratureError::no_results(self.kind, query));
        }
        Ok(self.records.clone())
    }
}

/// Library with one new PubMed record (plus a duplicate of the initial
/// reference) and an empty Scholar
pub fn library() -> (Library, Arc<CountingConnector>, Arc<CountingConnector>) {
    let pubmed = CountingConnector::new(
        ConnectorKind::PubMed,
        vec![
            ReferenceRecord::new("Organoid ethics review", "Lee", "Review", "https://pubmed.example/1"),
            ReferenceRecord::new("Initial paper", "Kim", "Dup", INITIAL_LINK),
        ],
    );
    let scholar = CountingConnector::new(ConnectorKind::Scholar, Vec::new());
    (Library::new(pubmed.clone(), scholar.clone()), pubmed, scholar)
}

pub fn brief() -> DebateBrief {
    DebateBrief::new(
        "Ethical implications of human brain organoids",
        CriteriaSet::parse_list("1,3,4").unwrap(),
        vec![ReferenceRecord::new("Initial paper", "Kim", "Abstract", INITIAL_LINK)],
    )
}

pub fn logger() -> Arc<Logger> {
    Arc::new(Logger::new(LogFormat::Compact))
}
