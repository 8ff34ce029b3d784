use thiserror::Error;

use crate::{Persona, Round};

/// Malformed user input. Recovered by re-prompting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select exactly {expected} criteria (got {actual})")]
    WrongCriteriaCount { expected: usize, actual: usize },

    #[error("Criterion selected twice: {0}")]
    DuplicateCriterion(String),

    #[error("Custom criterion must not be empty")]
    EmptyCustomCriterion,

    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),

    #[error("Thesis must be at least {min} characters (got {actual})")]
    ThesisTooShort { min: usize, actual: usize },

    #[error("Session is missing {0}")]
    Incomplete(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Transcript needs {expected} round records, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("Duplicate record for {persona} in {round}")]
    Duplicate { round: Round, persona: Persona },
}

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Invalid session: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),
}
