use serde::{Serialize, Serializer};

use crate::ValidationError;

/// Number of criteria a session must select
pub const REQUIRED_CRITERIA: usize = 3;

/// An evaluation criterion: one of the fixed set or a user-supplied label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criterion {
    ScopeAndFit,
    AcademicRelevance,
    ResearchFeasibility,
    EthicalConsiderations,
    PossibleMethodology,
    ProfessionalRelevance,
    PersonalInterest,
    Custom(String),
}

impl Criterion {
    /// The fixed set, in menu order
    pub fn fixed() -> [Criterion; 7] {
        [
            Criterion::ScopeAndFit,
            Criterion::AcademicRelevance,
            Criterion::ResearchFeasibility,
            Criterion::EthicalConsiderations,
            Criterion::PossibleMethodology,
            Criterion::ProfessionalRelevance,
            Criterion::PersonalInterest,
        ]
    }

    pub fn custom(label: &str) -> Result<Self, ValidationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyCustomCriterion);
        }
        Ok(Criterion::Custom(label.to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            Criterion::ScopeAndFit => "Scope and Fit",
            Criterion::AcademicRelevance => "Academic Relevance and Novelty",
            Criterion::ResearchFeasibility => "Research Feasibility",
            Criterion::EthicalConsiderations => "Ethical Considerations",
            Criterion::PossibleMethodology => "Possible Methodology",
            Criterion::ProfessionalRelevance => "Professional and Future Relevance",
            Criterion::PersonalInterest => "Personal Interest and Motivation",
            Criterion::Custom(label) => label,
        }
    }

    /// Parse one token of a `--criteria` list: a 1-based menu index,
    /// a fixed label (case-insensitive) or `custom:<text>`.
    pub fn parse_token(token: &str) -> Result<Self, ValidationError> {
        let token = token.trim();
        if let Some(label) = token.strip_prefix("custom:") {
            return Criterion::custom(label);
        }
        let fixed = Criterion::fixed();
        if let Ok(index) = token.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| fixed.get(i).cloned())
                .ok_or_else(|| ValidationError::UnknownCriterion(token.to_string()));
        }
        fixed
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(token))
            .ok_or_else(|| ValidationError::UnknownCriterion(token.to_string()))
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Exactly [`REQUIRED_CRITERIA`] distinct criteria, frozen for the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CriteriaSet(Vec<Criterion>);

impl CriteriaSet {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self, ValidationError> {
        if criteria.len() != REQUIRED_CRITERIA {
            return Err(ValidationError::WrongCriteriaCount {
                expected: REQUIRED_CRITERIA,
                actual: criteria.len(),
            });
        }
        for (i, criterion) in criteria.iter().enumerate() {
            if criterion.label().trim().is_empty() {
                return Err(ValidationError::EmptyCustomCriterion);
            }
            if criteria[..i]
                .iter()
                .any(|c| c.label().eq_ignore_ascii_case(criterion.label()))
            {
                return Err(ValidationError::DuplicateCriterion(criterion.label().to_string()));
            }
        }
        Ok(Self(criteria))
    }

    /// Parse a comma-separated `--criteria` value
    pub fn parse_list(list: &str) -> Result<Self, ValidationError> {
        let criteria = list
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(Criterion::parse_token)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(criteria)
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|c| c.label().to_string()).collect()
    }

    /// Comma-joined labels for prompts
    pub fn as_context(&self) -> String {
        self.labels().join(", ")
    }
}
