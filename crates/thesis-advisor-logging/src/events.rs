use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Debate side producing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Pro,
    Con,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Pro => write!(f, "PRO"),
            Speaker::Con => write!(f, "CON"),
        }
    }
}

/// Structured log events for a thesis-advisor session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionStarted {
        session_id: String,
        thesis: String,
    },
    RouteSelected {
        connector: String,
        fallback: bool,
        reason: Option<String>,
    },
    ReferencesFetched {
        connector: String,
        count: usize,
    },
    SearchFailed {
        connector: String,
        error: String,
        no_results: bool,
    },
    CriteriaSelected {
        criteria: Vec<String>,
    },
    RoundStarted {
        round: u8,
        label: String,
        search_enabled: bool,
    },
    /// First inference attempt of a turn failed
    TurnRetried {
        round: u8,
        speaker: Speaker,
        error: String,
    },
    ToolInvoked {
        round: u8,
        speaker: Speaker,
        connector: String,
        query: String,
        results: usize,
        error: Option<String>,
    },
    /// Model asked for a tool in a round where none was declared
    ToolCallRejected {
        round: u8,
        speaker: Speaker,
        tool: String,
    },
    TurnCompleted {
        round: u8,
        speaker: Speaker,
        used_search: bool,
        new_references: usize,
        failed: bool,
        duration_secs: f64,
    },
    RoundCompleted {
        round: u8,
    },
    DebateInterrupted {
        completed_rounds: u8,
    },
    AdjudicationStarted {
        records: usize,
    },
    VerdictReached {
        winner: String,
        pro_score: f64,
        con_score: f64,
        duration_secs: f64,
    },
    JudgmentFailed {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for session events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::SessionStarted { session_id, thesis } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "thesis-advisor".bold().bright_white(),
                    " ".repeat(53) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Thesis:".dimmed(),
                    Self::truncate_with_padding(thesis, 60, 68).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Session:".dimmed(),
                    Self::truncate_with_padding(session_id, 59, 67).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::RouteSelected {
                connector,
                fallback,
                reason,
            } => {
                if *fallback {
                    let _ = writeln!(
                        stderr,
                        "  {} Routed to {} (fallback: {})",
                        "⚠".bright_yellow(),
                        connector.bright_cyan(),
                        reason.as_deref().unwrap_or("unknown").dimmed()
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "  {} Routed to {}",
                        "→".bright_cyan(),
                        connector.bright_cyan()
                    );
                }
            }
            LogEvent::ReferencesFetched { connector, count } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} from {}",
                    "✓".bright_green(),
                    count,
                    if *count == 1 { "reference" } else { "references" },
                    connector
                );
            }
            LogEvent::SearchFailed {
                connector,
                error,
                no_results,
            } => {
                let marker = if *no_results {
                    "∅".bright_yellow()
                } else {
                    "✗".bright_red()
                };
                let _ = writeln!(stderr, "  {} {}: {}", marker, connector, error.dimmed());
            }
            LogEvent::CriteriaSelected { criteria } => {
                let _ = writeln!(
                    stderr,
                    "  {} Criteria: {}",
                    "✓".bright_green(),
                    criteria.join(", ")
                );
                let _ = writeln!(stderr);
            }
            LogEvent::RoundStarted {
                round,
                label,
                search_enabled,
            } => {
                let round_text = format!(
                    "─ Round {} · {}{} ",
                    round,
                    label,
                    if *search_enabled { " (search)" } else { "" }
                );
                let padding = "─".repeat(67usize.saturating_sub(round_text.chars().count()));
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    round_text.bright_blue().bold(),
                    padding.bright_blue()
                );
            }
            LogEvent::TurnRetried {
                speaker, error, ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} retrying: {}",
                    "↻".bright_yellow(),
                    speaker,
                    error.dimmed()
                );
            }
            LogEvent::ToolInvoked {
                speaker,
                connector,
                query,
                results,
                error,
                ..
            } => match error {
                Some(error) => {
                    let _ = writeln!(
                        stderr,
                        "    {} {} searched {} for \"{}\": {}",
                        "✗".bright_red(),
                        speaker,
                        connector,
                        query,
                        error.dimmed()
                    );
                }
                None => {
                    let _ = writeln!(
                        stderr,
                        "    {} {} searched {} for \"{}\" ({} results)",
                        "🔎".dimmed(),
                        speaker,
                        connector,
                        query,
                        results
                    );
                }
            },
            LogEvent::ToolCallRejected { speaker, tool, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} called {} in a closed round, ignored",
                    "⚠".bright_yellow(),
                    speaker,
                    tool
                );
            }
            LogEvent::TurnCompleted {
                speaker,
                used_search,
                new_references,
                failed,
                duration_secs,
                ..
            } => {
                let name = match speaker {
                    Speaker::Pro => speaker.to_string().bright_cyan().bold(),
                    Speaker::Con => speaker.to_string().bright_magenta().bold(),
                };
                if *failed {
                    let _ = writeln!(
                        stderr,
                        "  {} {} failed after retry ({:.1}s)",
                        "✗".bright_red(),
                        name,
                        duration_secs
                    );
                } else if *used_search {
                    let _ = writeln!(
                        stderr,
                        "  {} {} ({:.1}s, {} new {})",
                        "✓".bright_green(),
                        name,
                        duration_secs,
                        new_references,
                        if *new_references == 1 { "reference" } else { "references" }
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "  {} {} ({:.1}s)",
                        "✓".bright_green(),
                        name,
                        duration_secs
                    );
                }
            }
            LogEvent::RoundCompleted { .. } => {
                let _ = writeln!(
                    stderr,
                    "{}",
                    "└─────────────────────────────────────────────────────────────────────┘"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::DebateInterrupted { completed_rounds } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Debate interrupted after {} round(s)",
                    "⚠".bright_yellow(),
                    completed_rounds
                );
            }
            LogEvent::AdjudicationStarted { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    "JUDGE".bright_magenta().bold()
                );
            }
            LogEvent::VerdictReached {
                winner,
                pro_score,
                con_score,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {}",
                    format!(
                        "✓ Verdict: {} (PRO {:.1} / CON {:.1}, {:.1}s)",
                        winner, pro_score, con_score, duration_secs
                    )
                    .bright_green()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::JudgmentFailed { error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Judgment failed: {}",
                    "✗".bright_red(),
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::SessionStarted { session_id, .. } => {
                format!("[{}] session:start {}", timestamp, session_id)
            }
            LogEvent::RouteSelected {
                connector,
                fallback,
                ..
            } => format!(
                "[{}] route:{}{}",
                timestamp,
                connector,
                if *fallback { " (fallback)" } else { "" }
            ),
            LogEvent::ReferencesFetched { connector, count } => {
                format!("[{}] refs:{} {}", timestamp, connector, count)
            }
            LogEvent::SearchFailed {
                connector, error, ..
            } => format!("[{}] refs:error:{} {}", timestamp, connector, error),
            LogEvent::CriteriaSelected { criteria } => {
                format!("[{}] criteria:{}", timestamp, criteria.join("|"))
            }
            LogEvent::RoundStarted { round, label, .. } => {
                format!("[{}] round:start:{} {}", timestamp, round, label)
            }
            LogEvent::TurnRetried {
                round,
                speaker,
                error,
            } => format!("[{}] turn:retry:{}:{} {}", timestamp, round, speaker, error),
            LogEvent::ToolInvoked {
                round,
                speaker,
                connector,
                results,
                ..
            } => format!(
                "[{}] tool:{}:{} {} n={}",
                timestamp, round, speaker, connector, results
            ),
            LogEvent::ToolCallRejected {
                round,
                speaker,
                tool,
            } => format!("[{}] tool:rejected:{}:{} {}", timestamp, round, speaker, tool),
            LogEvent::TurnCompleted {
                round,
                speaker,
                failed,
                new_references,
                duration_secs,
                ..
            } => format!(
                "[{}] turn:done:{}:{} failed={} refs={} {:.1}s",
                timestamp, round, speaker, failed, new_references, duration_secs
            ),
            LogEvent::RoundCompleted { round } => {
                format!("[{}] round:done:{}", timestamp, round)
            }
            LogEvent::DebateInterrupted { completed_rounds } => {
                format!("[{}] debate:interrupted:{}", timestamp, completed_rounds)
            }
            LogEvent::AdjudicationStarted { records } => {
                format!("[{}] judge:start records={}", timestamp, records)
            }
            LogEvent::VerdictReached {
                winner,
                pro_score,
                con_score,
                ..
            } => format!(
                "[{}] judge:done {} {:.1}/{:.1}",
                timestamp, winner, pro_score, con_score
            ),
            LogEvent::JudgmentFailed { error } => {
                format!("[{}] judge:error {}", timestamp, error)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let cut: String = s.chars().take(max_len - 3).collect();
            format!("{}...", cut)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
