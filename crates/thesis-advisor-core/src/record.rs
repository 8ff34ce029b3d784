use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thesis_advisor_literature::ReferenceRecord;

use crate::{Persona, Round};

/// One persona's output for one round. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: Round,
    pub persona: Persona,
    pub text: String,
    pub used_search: bool,
    /// References fetched during this turn; always empty in gated rounds
    pub new_references: Vec<ReferenceRecord>,
    /// Inference failed twice and `text` is a placeholder
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_secs: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoundRecord {
    pub fn new(round: Round, persona: Persona, text: impl Into<String>) -> Self {
        Self {
            round,
            persona,
            text: text.into(),
            used_search: false,
            new_references: Vec::new(),
            failed: false,
            error: None,
            duration_secs: 0.0,
            timestamp: Utc::now(),
        }
    }

    /// Stand-in for a turn whose inference failed after the retry
    pub fn placeholder(round: Round, persona: Persona, error: impl Into<String>) -> Self {
        let text = format!(
            "[{} gave no argument in round {} ({}): the model call failed twice.]",
            persona,
            round.number(),
            round.label()
        );
        Self {
            failed: true,
            error: Some(error.into()),
            ..Self::new(round, persona, text)
        }
    }

    pub fn with_search(mut self, new_references: Vec<ReferenceRecord>) -> Self {
        self.used_search = true;
        self.new_references = new_references;
        self
    }

    pub fn with_duration(mut self, duration: std::time::Duration) -> Self {
        self.duration_secs = duration.as_secs_f64();
        self
    }

    /// Canonical transcript position
    pub fn sort_key(&self) -> (Round, Persona) {
        (self.round, self.persona)
    }
}
