use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};

use thesis_advisor_agent::{Agent, AgentError, AgentOutput, AgentRequest, Message, ToolCall, ToolSpec};
use thesis_advisor_literature::{format_for_context, ConnectorKind, Library, ReferenceRecord};
use thesis_advisor_logging::{LogEvent, Logger};

use crate::{DebateBrief, DebatePrompts, Persona, PersonaBuffer, Round, RoundContext, RoundRecord};

/// Name of the literature search function declared in search rounds
pub const SEARCH_TOOL: &str = "search_literature";

/// Tool calls honoured per turn; later ones are rejected
pub const MAX_SEARCHES_PER_TURN: usize = 2;

/// Called once per round with the PRO and CON records, before the next round starts
pub type RoundCallback = Arc<dyn Fn(&RoundRecord, &RoundRecord) + Send + Sync>;

/// Declaration of the search function
pub fn search_tool() -> ToolSpec {
    let sources: Vec<&str> = ConnectorKind::ALL.iter().map(|k| k.id()).collect();
    let source_help = ConnectorKind::ALL
        .iter()
        .map(|k| format!("{}: {}", k.id(), k.description()))
        .collect::<Vec<_>>()
        .join("; ");

    ToolSpec {
        name: SEARCH_TOOL.to_string(),
        description: "Search academic literature for new references that support your argument. \
                      Returns up to 5 articles."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "enum": sources,
                    "description": source_help
                },
                "query": {
                    "type": "string",
                    "description": "Keyword query for the search service"
                }
            },
            "required": ["source", "query"]
        }),
    }
}

/// Result of running the round protocol
#[derive(Debug, Clone)]
pub struct DebateRun {
    /// Records of every completed round, both personas, in completion order
    pub records: Vec<RoundRecord>,
    pub completed_rounds: u8,
    pub interrupted: bool,
}

/// Text and evidence produced by one successful turn
struct Turn {
    text: String,
    searched: bool,
    new_references: Vec<ReferenceRecord>,
}

/// Drives the five-round protocol for both personas
pub struct DebateController<'a> {
    agent: &'a dyn Agent,
    library: &'a Library,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
    on_round: Option<RoundCallback>,
}

impl<'a> DebateController<'a> {
    pub fn new(agent: &'a dyn Agent, library: &'a Library, logger: Arc<Logger>) -> Self {
        Self {
            agent,
            library,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
            on_round: None,
        }
    }

    /// Share an externally owned interrupt flag
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn with_round_callback(mut self, callback: RoundCallback) -> Self {
        self.on_round = Some(callback);
        self
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Run all rounds, stopping early only at a round boundary after an interrupt
    pub async fn run(&self, brief: &DebateBrief) -> DebateRun {
        let mut pro = PersonaBuffer::new(Persona::Pro);
        let mut con = PersonaBuffer::new(Persona::Con);
        let mut completed_rounds = 0;

        for round in Round::ALL {
            if self.interrupted.load(Ordering::SeqCst) {
                info!(completed_rounds, "Debate interrupted by user");
                self.logger
                    .log(&LogEvent::DebateInterrupted { completed_rounds });
                return DebateRun {
                    records: merge(pro, con),
                    completed_rounds,
                    interrupted: true,
                };
            }

            let (pro_record, con_record) = self.run_round(round, brief, &pro, &con).await;
            if let Some(ref callback) = self.on_round {
                callback(&pro_record, &con_record);
            }
            pro.push(pro_record);
            con.push(con_record);
            completed_rounds = round.number();
        }

        DebateRun {
            records: merge(pro, con),
            completed_rounds,
            interrupted: false,
        }
    }

    /// Run both personas' turns for one round concurrently and join.
    /// Neither turn sees the other's output for this round.
    pub async fn run_round(
        &self,
        round: Round,
        brief: &DebateBrief,
        pro: &PersonaBuffer,
        con: &PersonaBuffer,
    ) -> (RoundRecord, RoundRecord) {
        let descriptor = round.descriptor();
        self.logger.log(&LogEvent::RoundStarted {
            round: descriptor.number,
            label: descriptor.label.to_string(),
            search_enabled: descriptor.search_enabled,
        });

        let pro_ctx = RoundContext::assemble(round, pro, con, brief);
        let con_ctx = RoundContext::assemble(round, con, pro, brief);
        let (pro_record, con_record) = tokio::join!(self.run_turn(pro_ctx), self.run_turn(con_ctx));

        self.logger.log(&LogEvent::RoundCompleted {
            round: descriptor.number,
        });
        (pro_record, con_record)
    }

    /// The inference request for a turn. The search tool is declared only in
    /// search-enabled rounds.
    pub fn build_request(ctx: &RoundContext<'_>) -> AgentRequest {
        let request = AgentRequest::new(
            DebatePrompts::system_instruction(ctx.persona, ctx.brief),
            DebatePrompts::turn_prompt(ctx),
        );
        if ctx.round.search_enabled() {
            request.with_tools(vec![search_tool()])
        } else {
            request
        }
    }

    async fn run_turn(&self, ctx: RoundContext<'_>) -> RoundRecord {
        let started = Instant::now();
        let round = ctx.round;
        let persona = ctx.persona;

        let record = match self.argue(&ctx).await {
            Ok(turn) => {
                let record = RoundRecord::new(round, persona, turn.text);
                if turn.searched {
                    record.with_search(turn.new_references)
                } else {
                    record
                }
            }
            Err(e) => {
                warn!(round = round.number(), %persona, error = %e, "Turn failed after retry");
                RoundRecord::placeholder(round, persona, e.to_string())
            }
        }
        .with_duration(started.elapsed());

        self.logger.log(&LogEvent::TurnCompleted {
            round: round.number(),
            speaker: persona.into(),
            used_search: record.used_search,
            new_references: record.new_references.len(),
            failed: record.failed,
            duration_secs: record.duration_secs,
        });
        record
    }

    async fn argue(&self, ctx: &RoundContext<'_>) -> Result<Turn, AgentError> {
        let request = Self::build_request(ctx);
        let output = self.generate_with_retry(ctx, &request).await?;

        if !request.has_tools() || !output.has_tool_calls() {
            return Ok(Turn {
                text: output.text,
                searched: false,
                new_references: Vec::new(),
            });
        }

        let mut calls = output.tool_calls;
        let excess = calls.split_off(calls.len().min(MAX_SEARCHES_PER_TURN));
        for call in &excess {
            self.reject(ctx, call);
        }

        let mut fresh = Vec::new();
        let mut searched = false;
        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let (content, ran) = self.execute_search(ctx, call, &mut fresh).await;
            searched |= ran;
            results.push((call.name.clone(), content));
        }

        let follow_up = request
            .with_message(Message::tool_calls(&calls))
            .with_message(Message::tool_results(results))
            .without_tools();
        let output = self.generate_with_retry(ctx, &follow_up).await?;

        Ok(Turn {
            text: output.text,
            searched,
            new_references: fresh,
        })
    }

    /// One inference call, repeated once with the identical request on failure
    async fn generate_with_retry(
        &self,
        ctx: &RoundContext<'_>,
        request: &AgentRequest,
    ) -> Result<AgentOutput, AgentError> {
        match self.generate(ctx, request).await {
            Ok(output) => Ok(output),
            Err(e) => {
                self.logger.log(&LogEvent::TurnRetried {
                    round: ctx.round.number(),
                    speaker: ctx.persona.into(),
                    error: e.to_string(),
                });
                self.generate(ctx, request).await
            }
        }
    }

    async fn generate(
        &self,
        ctx: &RoundContext<'_>,
        request: &AgentRequest,
    ) -> Result<AgentOutput, AgentError> {
        debug!(
            round = ctx.round.number(),
            persona = %ctx.persona,
            tools = request.tools.len(),
            "Requesting turn"
        );
        let output = self.agent.generate(request).await?;

        if !request.has_tools() {
            for call in &output.tool_calls {
                self.reject(ctx, call);
            }
        }

        let usable_calls = request.has_tools() && output.has_tool_calls();
        if output.text.trim().is_empty() && !usable_calls {
            return Err(AgentError::EmptyResponse);
        }
        Ok(output)
    }

    /// Run one requested search. Returns the function response for the model
    /// and whether a connector was actually queried.
    async fn execute_search(
        &self,
        ctx: &RoundContext<'_>,
        call: &ToolCall,
        fresh: &mut Vec<ReferenceRecord>,
    ) -> (serde_json::Value, bool) {
        let source = call
            .str_arg("source")
            .and_then(|s| s.parse::<ConnectorKind>().ok());
        let query = call.str_arg("query").map(str::trim).filter(|q| !q.is_empty());

        let (kind, query) = match (call.name == SEARCH_TOOL, source, query) {
            (true, Some(kind), Some(query)) => (kind, query),
            _ => {
                self.reject(ctx, call);
                return (
                    json!({
                        "error": "Invalid search_literature call: give source \"pubmed\" or \"scholar\" and a non-empty query"
                    }),
                    false,
                );
            }
        };

        match self.library.search(kind, query).await {
            Ok(records) => {
                let mut new: Vec<ReferenceRecord> = Vec::new();
                for record in records {
                    let seen = !record.link.is_empty()
                        && (ctx.knows_link(&record.link)
                            || fresh.iter().chain(new.iter()).any(|f| f.link == record.link));
                    if !seen {
                        new.push(record);
                    }
                }

                self.logger.log(&LogEvent::ToolInvoked {
                    round: ctx.round.number(),
                    speaker: ctx.persona.into(),
                    connector: kind.to_string(),
                    query: query.to_string(),
                    results: new.len(),
                    error: None,
                });

                let content = if new.is_empty() {
                    json!({
                        "source": kind.id(),
                        "query": query,
                        "results": "All results are already among your references."
                    })
                } else {
                    json!({
                        "source": kind.id(),
                        "query": query,
                        "results": format_for_context(&new)
                    })
                };
                fresh.extend(new);
                (content, true)
            }
            Err(e) => {
                self.logger.log(&LogEvent::ToolInvoked {
                    round: ctx.round.number(),
                    speaker: ctx.persona.into(),
                    connector: kind.to_string(),
                    query: query.to_string(),
                    results: 0,
                    error: Some(e.to_string()),
                });
                (
                    json!({
                        "source": kind.id(),
                        "query": query,
                        "error": e.to_string(),
                        "no_results": e.is_no_results()
                    }),
                    true,
                )
            }
        }
    }

    fn reject(&self, ctx: &RoundContext<'_>, call: &ToolCall) {
        warn!(round = ctx.round.number(), persona = %ctx.persona, tool = %call.name, "Tool call rejected");
        self.logger.log(&LogEvent::ToolCallRejected {
            round: ctx.round.number(),
            speaker: ctx.persona.into(),
            tool: call.name.clone(),
        });
    }
}

fn merge(pro: PersonaBuffer, con: PersonaBuffer) -> Vec<RoundRecord> {
    let mut records = pro.into_records();
    records.extend(con.into_records());
    records
}
