//! # thesis-advisor-core
//!
//! The debate engine: five rounds between a PRO and a CON persona, followed
//! by a single adjudication.
//!
//! ## Key Types
//!
//! - [`Round`] / [`ROUND_TABLE`] - Per-round rules (label, search gate, opponent window)
//! - [`CriteriaSet`] - Exactly three evaluation criteria
//! - [`RoundContext`] - What a persona may see in a given round
//! - [`DebateController`] - Runs the rounds with a join after each one
//! - [`aggregate`] / [`Transcript`] - Canonically ordered debate record
//! - [`DebateRunner`] - Debate, aggregation and adjudication
//! - [`SessionOutcome`] - Terminal result of a session

mod context;
mod controller;
mod criteria;
mod error;
mod outcome;
mod persona;
mod prompts;
mod record;
mod rounds;
mod runner;
mod session;
mod transcript;

pub use context::{DebateBrief, PersonaBuffer, RoundContext};
pub use controller::{
    search_tool, DebateController, DebateRun, RoundCallback, MAX_SEARCHES_PER_TURN, SEARCH_TOOL,
};
pub use criteria::{CriteriaSet, Criterion, REQUIRED_CRITERIA};
pub use error::{DebateError, TranscriptError, ValidationError};
pub use outcome::SessionOutcome;
pub use persona::Persona;
pub use prompts::DebatePrompts;
pub use record::RoundRecord;
pub use rounds::{Round, RoundDescriptor, ROUND_TABLE};
pub use runner::DebateRunner;
pub use session::{validate_thesis, SessionState, MIN_THESIS_CHARS};
pub use transcript::{aggregate, Transcript, EXPECTED_RECORDS};
