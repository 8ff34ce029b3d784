use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use thesis_advisor_agent::Agent;
use thesis_advisor_judge::{AdjudicationInput, Adjudicator};
use thesis_advisor_literature::{format_for_context, Library};
use thesis_advisor_logging::{LogEvent, Logger};

use crate::controller::{DebateController, RoundCallback};
use crate::error::DebateError;
use crate::outcome::SessionOutcome;
use crate::transcript::{aggregate, Transcript};
use crate::DebateBrief;

/// Runs the debate and then the judge
pub struct DebateRunner<'a> {
    debater: &'a dyn Agent,
    judge: &'a dyn Agent,
    library: &'a Library,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
    on_round: Option<RoundCallback>,
}

impl<'a> DebateRunner<'a> {
    pub fn new(
        debater: &'a dyn Agent,
        judge: &'a dyn Agent,
        library: &'a Library,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            debater,
            judge,
            library,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
            on_round: None,
        }
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Print or collect each round as soon as both turns are in
    pub fn with_round_callback(mut self, callback: RoundCallback) -> Self {
        self.on_round = Some(callback);
        self
    }

    /// Debate, aggregate and adjudicate.
    ///
    /// Round failures never surface here; they are recorded in the transcript.
    /// A judge failure yields [`SessionOutcome::JudgmentFailed`] with the full
    /// transcript still attached.
    pub async fn run(&self, brief: DebateBrief) -> Result<SessionOutcome, DebateError> {
        let started = Instant::now();

        let mut controller = DebateController::new(self.debater, self.library, self.logger.clone())
            .with_interrupt(self.interrupted.clone());
        if let Some(ref callback) = self.on_round {
            controller = controller.with_round_callback(callback.clone());
        }

        let run = controller.run(&brief).await;
        if run.interrupted {
            let transcript = Transcript::partial(&run.records);
            return Ok(SessionOutcome::interrupted(
                brief,
                run.completed_rounds,
                transcript,
                started.elapsed(),
            ));
        }

        let transcript = aggregate(&run.records)?;
        info!(
            records = transcript.len(),
            failed_turns = transcript.failed_turns(),
            "Debate complete"
        );

        if self.interrupted.load(Ordering::SeqCst) {
            self.logger.log(&LogEvent::DebateInterrupted {
                completed_rounds: run.completed_rounds,
            });
            return Ok(SessionOutcome::interrupted(
                brief,
                run.completed_rounds,
                transcript,
                started.elapsed(),
            ));
        }

        self.logger.log(&LogEvent::AdjudicationStarted {
            records: transcript.len(),
        });

        let judge_started = Instant::now();
        let criteria = brief.criteria.labels();
        let references = format_for_context(&brief.references);
        let rendered = transcript.render();
        let input = AdjudicationInput {
            thesis: &brief.thesis,
            criteria: &criteria,
            references: &references,
            transcript: &rendered,
        };

        match Adjudicator::new(self.judge).judge(input).await {
            Ok(verdict) => {
                let missing = verdict.missing_criteria(&criteria);
                if !missing.is_empty() {
                    warn!(?missing, "Verdict does not address every selected criterion");
                }
                info!(verdict = %verdict.short_description(), "Debate adjudicated");
                self.logger.log(&LogEvent::VerdictReached {
                    winner: verdict.winner.to_string(),
                    pro_score: verdict.scores.pro,
                    con_score: verdict.scores.con,
                    duration_secs: judge_started.elapsed().as_secs_f64(),
                });
                Ok(SessionOutcome::judged(
                    brief,
                    verdict,
                    transcript,
                    started.elapsed(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "Adjudication failed");
                self.logger.log(&LogEvent::JudgmentFailed {
                    error: e.to_string(),
                });
                Ok(SessionOutcome::judgment_failed(
                    brief,
                    e.to_string(),
                    transcript,
                    started.elapsed(),
                ))
            }
        }
    }
}
