use serde::Serialize;
use std::time::Duration;
use thesis_advisor_judge::Verdict;

use crate::{DebateBrief, Transcript};

/// The final outcome of one advisor session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The judge produced a verdict
    Judged {
        brief: DebateBrief,
        verdict: Verdict,
        transcript: Transcript,
        total_duration_secs: f64,
    },
    /// All rounds ran but adjudication failed; the transcript is intact
    JudgmentFailed {
        brief: DebateBrief,
        error: String,
        transcript: Transcript,
        total_duration_secs: f64,
    },
    /// User requested stop (e.g., Ctrl+C) between rounds
    Interrupted {
        brief: DebateBrief,
        completed_rounds: u8,
        transcript: Transcript,
        total_duration_secs: f64,
    },
    /// User quit before the debate started
    Declined { reason: String },
}

impl SessionOutcome {
    pub fn judged(
        brief: DebateBrief,
        verdict: Verdict,
        transcript: Transcript,
        duration: Duration,
    ) -> Self {
        Self::Judged {
            brief,
            verdict,
            transcript,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn judgment_failed(
        brief: DebateBrief,
        error: String,
        transcript: Transcript,
        duration: Duration,
    ) -> Self {
        Self::JudgmentFailed {
            brief,
            error,
            transcript,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn interrupted(
        brief: DebateBrief,
        completed_rounds: u8,
        transcript: Transcript,
        duration: Duration,
    ) -> Self {
        Self::Interrupted {
            brief,
            completed_rounds,
            transcript,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: reason.into(),
        }
    }

    /// Whatever transcript exists, complete or not
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Self::Judged { transcript, .. }
            | Self::JudgmentFailed { transcript, .. }
            | Self::Interrupted { transcript, .. } => Some(transcript),
            Self::Declined { .. } => None,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Judged { verdict, .. } => Some(verdict),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Judged { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Judged { .. } => 0,
            Self::JudgmentFailed { .. } => 1,
            Self::Interrupted { .. } => 130,
            Self::Declined { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CriteriaSet;

    #[test]
    fn test_exit_codes_and_transcript_access() {
        let brief = DebateBrief::new("A thesis", CriteriaSet::parse_list("1,2,3").unwrap(), vec![]);
        let failed = SessionOutcome::judgment_failed(
            brief.clone(),
            "quota".into(),
            Transcript::partial(&[]),
            Duration::from_secs(1),
        );
        assert_eq!(failed.exit_code(), 1);
        assert!(failed.transcript().is_some());
        assert!(failed.verdict().is_none());

        let interrupted =
            SessionOutcome::interrupted(brief, 2, Transcript::partial(&[]), Duration::ZERO);
        assert_eq!(interrupted.exit_code(), 130);

        let declined = SessionOutcome::declined("user quit");
        assert_eq!(declined.exit_code(), 0);
        assert!(declined.transcript().is_none());
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(SessionOutcome::declined("user quit")).unwrap();
        assert_eq!(json["status"], "declined");
        assert_eq!(json["reason"], "user quit");
    }
}
