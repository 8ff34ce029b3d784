use thesis_advisor_literature::{ReferenceRecord, RouteDecision, RoutedSearch};
use uuid::Uuid;

use crate::{CriteriaSet, DebateBrief, SessionOutcome, ValidationError};

/// Shortest thesis accepted; a stray Enter must not start a search
pub const MIN_THESIS_CHARS: usize = 10;

/// Trim and check a thesis statement
pub fn validate_thesis(input: &str) -> Result<String, ValidationError> {
    let thesis = input.trim();
    let actual = thesis.chars().count();
    if actual < MIN_THESIS_CHARS {
        return Err(ValidationError::ThesisTooShort {
            min: MIN_THESIS_CHARS,
            actual,
        });
    }
    Ok(thesis.to_string())
}

/// Everything one interactive run accumulates. Lives for one process only.
#[derive(Debug)]
pub struct SessionState {
    id: Uuid,
    thesis: Option<String>,
    route: Option<RouteDecision>,
    references: Vec<ReferenceRecord>,
    criteria: Option<CriteriaSet>,
    outcome: Option<SessionOutcome>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            thesis: None,
            route: None,
            references: Vec::new(),
            criteria: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Set or refine the thesis. Earlier search results and criteria are discarded.
    pub fn set_thesis(&mut self, input: &str) -> Result<&str, ValidationError> {
        let thesis = validate_thesis(input)?;
        self.route = None;
        self.references.clear();
        self.criteria = None;
        Ok(self.thesis.insert(thesis).as_str())
    }

    pub fn record_search(&mut self, search: RoutedSearch) {
        self.route = Some(search.decision);
        self.references = search.records;
    }

    pub fn route(&self) -> Option<&RouteDecision> {
        self.route.as_ref()
    }

    pub fn references(&self) -> &[ReferenceRecord] {
        &self.references
    }

    pub fn set_criteria(&mut self, criteria: CriteriaSet) {
        self.criteria = Some(criteria);
    }

    /// Frozen debate inputs. Requires thesis, references and criteria.
    pub fn brief(&self) -> Result<DebateBrief, ValidationError> {
        let thesis = self.thesis.clone().ok_or(ValidationError::Incomplete("a thesis"))?;
        if self.references.is_empty() {
            return Err(ValidationError::Incomplete("references"));
        }
        let criteria = self
            .criteria
            .clone()
            .ok_or(ValidationError::Incomplete("criteria"))?;
        Ok(DebateBrief::new(thesis, criteria, self.references.clone()))
    }

    pub fn finish(&mut self, outcome: SessionOutcome) -> &SessionOutcome {
        self.outcome.insert(outcome)
    }
}
