use serde::Serialize;
use thesis_advisor_literature::ReferenceRecord;

use crate::{CriteriaSet, Persona, Round, RoundRecord};

/// Frozen inputs shared read-only by both personas for the whole debate
#[derive(Debug, Clone, Serialize)]
pub struct DebateBrief {
    pub thesis: String,
    pub criteria: CriteriaSet,
    /// Initial references from the routed connector
    pub references: Vec<ReferenceRecord>,
}

impl DebateBrief {
    pub fn new(thesis: impl Into<String>, criteria: CriteriaSet, references: Vec<ReferenceRecord>) -> Self {
        Self {
            thesis: thesis.into(),
            criteria,
            references,
        }
    }
}

/// A persona's isolated history. Stored in full and only ever appended to.
#[derive(Debug, Clone)]
pub struct PersonaBuffer {
    persona: Persona,
    history: Vec<RoundRecord>,
}

impl PersonaBuffer {
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            history: Vec::new(),
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Append the persona's record for the next round
    pub fn push(&mut self, record: RoundRecord) {
        debug_assert_eq!(record.persona, self.persona);
        debug_assert!(self.history.last().map_or(true, |last| last.round < record.round));
        self.history.push(record);
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn into_records(self) -> Vec<RoundRecord> {
        self.history
    }
}

/// What one persona may see when producing its turn for `round`.
///
/// Built fresh each round from both buffers without touching them: the
/// persona's own records before `round`, the opponent records inside the
/// round's window, and references the persona fetched in earlier rounds.
#[derive(Debug, Clone)]
pub struct RoundContext<'a> {
    pub round: Round,
    pub persona: Persona,
    pub brief: &'a DebateBrief,
    pub own_history: Vec<&'a RoundRecord>,
    pub opponent: Vec<&'a RoundRecord>,
    pub fetched_references: Vec<&'a ReferenceRecord>,
}

impl<'a> RoundContext<'a> {
    pub fn assemble(
        round: Round,
        own: &'a PersonaBuffer,
        opponent: &'a PersonaBuffer,
        brief: &'a DebateBrief,
    ) -> Self {
        let own_history: Vec<&RoundRecord> =
            own.history().iter().filter(|r| r.round < round).collect();

        let visible = round.visible_opponent_rounds();
        let opponent_records = opponent
            .history()
            .iter()
            .filter(|r| visible.contains(&r.round))
            .collect();

        let fetched_references = own_history
            .iter()
            .flat_map(|r| r.new_references.iter())
            .collect();

        Self {
            round,
            persona: own.persona(),
            brief,
            own_history,
            opponent: opponent_records,
            fetched_references,
        }
    }

    /// Whether a reference with this link is already in view. An empty link
    /// identifies nothing and is never known.
    pub fn knows_link(&self, link: &str) -> bool {
        if link.is_empty() {
            return false;
        }
        self.brief.references.iter().any(|r| r.link == link)
            || self.fetched_references.iter().any(|r| r.link == link)
    }
}
