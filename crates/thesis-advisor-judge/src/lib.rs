pub mod adjudicator;
mod prompts;
mod verdict;

pub use adjudicator::{AdjudicationInput, Adjudicator, JudgmentError};
pub use prompts::JudgePrompts;
pub use verdict::{CriterionFeedback, Scores, Verdict, VerdictParseError, Winner};
