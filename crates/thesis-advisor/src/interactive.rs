//! Line-oriented prompts: thesis, next step and criteria.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, MultiSelect, Select};

use thesis_advisor_core::{validate_thesis, CriteriaSet, Criterion, ValidationError, REQUIRED_CRITERIA};

const CUSTOM_ITEM: &str = "Custom criterion…";

/// What to do after a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Quit,
    Refine,
    Continue,
}

impl NextStep {
    /// Continue is only offered when references were found
    pub fn options(have_references: bool) -> &'static [NextStep] {
        if have_references {
            &[NextStep::Continue, NextStep::Refine, NextStep::Quit]
        } else {
            &[NextStep::Refine, NextStep::Quit]
        }
    }

    fn label(self) -> &'static str {
        match self {
            NextStep::Quit => "Quit",
            NextStep::Refine => "Refine the thesis",
            NextStep::Continue => "Continue to criteria and debate",
        }
    }
}

pub fn prompt_thesis() -> Result<String> {
    let thesis: String = Input::new()
        .with_prompt("Thesis idea")
        .validate_with(|input: &String| -> Result<(), String> {
            validate_thesis(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(thesis)
}

pub fn prompt_next_step(have_references: bool) -> Result<NextStep> {
    let options = NextStep::options(have_references);
    let labels: Vec<&str> = options.iter().map(|o| o.label()).collect();
    let selection = Select::new()
        .with_prompt("What next?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(options[selection])
}

/// Ask until exactly three valid criteria are chosen
pub fn prompt_criteria() -> Result<CriteriaSet> {
    let fixed = Criterion::fixed();
    let mut items: Vec<&str> = fixed.iter().map(Criterion::label).collect();
    items.push(CUSTOM_ITEM);

    loop {
        let picked = MultiSelect::new()
            .with_prompt(format!(
                "Select exactly {} evaluation criteria (space to toggle, enter to confirm)",
                REQUIRED_CRITERIA
            ))
            .items(&items)
            .interact()?;

        let custom = if picked.contains(&fixed.len()) {
            let label: String = Input::new()
                .with_prompt("Custom criterion")
                .allow_empty(true)
                .interact_text()?;
            Some(label)
        } else {
            None
        };

        match criteria_from_selection(&picked, custom.as_deref()) {
            Ok(set) => return Ok(set),
            Err(e) => eprintln!("  {} {}", "✗".bright_red(), e),
        }
    }
}

/// Turn menu indices into a criteria set. The index one past the fixed set
/// stands for the custom slot.
pub fn criteria_from_selection(
    picked: &[usize],
    custom: Option<&str>,
) -> Result<CriteriaSet, ValidationError> {
    let fixed = Criterion::fixed();
    let mut criteria = Vec::with_capacity(picked.len());
    for &index in picked {
        match fixed.get(index) {
            Some(criterion) => criteria.push(criterion.clone()),
            None if index == fixed.len() => criteria.push(Criterion::custom(custom.unwrap_or(""))?),
            None => return Err(ValidationError::UnknownCriterion(index.to_string())),
        }
    }
    CriteriaSet::new(criteria)
}
