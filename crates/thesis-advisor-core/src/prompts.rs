use thesis_advisor_literature::{format_for_context, ReferenceRecord};

use crate::{DebateBrief, Persona, RoundContext, RoundRecord};

/// Prompt templates for the two debaters
pub struct DebatePrompts;

impl DebatePrompts {
    /// Persona instruction: stance, thesis, criteria and the initial references.
    /// Identical for every round of the debate.
    pub fn system_instruction(persona: Persona, brief: &DebateBrief) -> String {
        format!(
            r#"You are the {persona} debater in a five-round academic debate about a proposed thesis topic.
{stance}

## Thesis
{thesis}

## Evaluation Criteria
{criteria}

## Initial References
{references}

## Rules
- Be as persuasive as the criteria allow, using only truthful claims.
- Support your points with specific details from the references when relevant and cite them by article title.
- Stay professional and concise (at most 250 words per turn).
- Follow the directive of the current round exactly."#,
            persona = persona,
            stance = persona.stance(),
            thesis = brief.thesis,
            criteria = brief.criteria.as_context(),
            references = format_for_context(&brief.references),
        )
    }

    /// The turn prompt for one round, built only from the assembled context
    pub fn turn_prompt(ctx: &RoundContext<'_>) -> String {
        let mut sections = Vec::new();

        if !ctx.own_history.is_empty() {
            let own = ctx
                .own_history
                .iter()
                .map(|r| Self::render_record(r))
                .collect::<Vec<_>>()
                .join("\n\n");
            sections.push(format!("## Your Previous Arguments\n{}", own));
        }

        if !ctx.fetched_references.is_empty() {
            let fetched: Vec<ReferenceRecord> =
                ctx.fetched_references.iter().map(|r| (*r).clone()).collect();
            sections.push(format!(
                "## References You Fetched Earlier\n{}",
                format_for_context(&fetched)
            ));
        }

        for record in &ctx.opponent {
            sections.push(format!(
                "## Opponent ({}) Argument\n{}",
                record.persona,
                Self::render_record(record)
            ));
        }

        let descriptor = ctx.round.descriptor();
        sections.push(format!(
            "CURRENT ROUND: {} ({})\n{}",
            descriptor.number, descriptor.label, descriptor.directive
        ));

        sections.join("\n\n")
    }

    fn render_record(record: &RoundRecord) -> String {
        let body = if record.failed {
            "(no argument: this turn failed)".to_string()
        } else {
            record.text.clone()
        };
        format!(
            "[Round {} | {}] {}",
            record.round.number(),
            record.round.label(),
            body
        )
    }
}
