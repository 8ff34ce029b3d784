use thesis_advisor_agent::Agent;
use tracing::{debug, info};

use crate::{JudgePrompts, Verdict, VerdictParseError};

/// Inputs required to adjudicate a debate
#[derive(Clone, Copy)]
pub struct AdjudicationInput<'a> {
    pub thesis: &'a str,
    pub criteria: &'a [String],
    /// Initial references, already formatted for context
    pub references: &'a str,
    /// Full ordered transcript, already rendered
    pub transcript: &'a str,
}

/// Runs the judge. Holds no state between debates.
pub struct Adjudicator<'a> {
    agent: &'a dyn Agent,
}

impl<'a> Adjudicator<'a> {
    pub fn new(agent: &'a dyn Agent) -> Self {
        Self { agent }
    }

    /// One inference call over the whole transcript. There is no fallback
    /// verdict: any failure is returned as a [`JudgmentError`].
    pub async fn judge(&self, input: AdjudicationInput<'_>) -> Result<Verdict, JudgmentError> {
        let prompt = JudgePrompts::build_adjudication_prompt(
            input.thesis,
            input.criteria,
            input.references,
            input.transcript,
        );

        debug!(prompt_len = prompt.len(), "Running adjudication");

        let output = self
            .agent
            .complete(JudgePrompts::system_instruction(), &prompt)
            .await
            .map_err(|e| JudgmentError::Inference(e.to_string()))?;

        info!(
            duration_secs = output.duration.as_secs_f64(),
            model = %output.model,
            "Judge completed"
        );

        Verdict::parse(&output.text).map_err(JudgmentError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JudgmentError {
    #[error("Judge inference failed: {0}")]
    Inference(String),

    #[error("Failed to parse verdict: {0}")]
    Parse(#[from] VerdictParseError),
}
