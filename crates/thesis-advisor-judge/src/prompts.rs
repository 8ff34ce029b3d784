/// Prompt templates for the judge
pub struct JudgePrompts;

impl JudgePrompts {
    /// System instruction: the scoring protocol and the required output format
    pub fn system_instruction() -> &'static str {
        r#"You are a neutral, rigorous debate judge evaluating a thesis idea. Do not use recency as a shortcut to decide: the side that spoke last gains nothing from speaking last.

## Debate Structure
The debate has five rounds. Both sides (PRO and CON) speak once per round.
1. Opening - independent opening case, initial references only
2. Rebuttal - rebuts the opponent's opening, no new evidence
3. Deepen - rebuts the opponent's round 2 and strengthens the own case; may fetch new references
4. Rebuttal - rebuts the opponent's round 3 only
5. Closing - independent final case, no rebuttal; may fetch new references

## Scoring Protocol
- Score every round independently, 1..10 per side, using only that round's text.
- Opening claims weigh 0.7, rebuttals weigh 0.3.
- Round 5 counts as 0.5 of a normal round.
- Credit evidence: claims grounded in the listed references or in references a side fetched during rounds 3 and 5 outrank unsupported claims.
- A turn marked FAILED carries no argument and scores 0 for that side in that round.
- Aggregate the weighted scores per side. If the totals are within 1 point you may declare a tie.

## Required Response Format
First give a short round-by-round assessment. Then end your response with a verdict block:

<verdict>
{"winner": "pro" | "con" | "tie",
 "scores": {"pro": <number>, "con": <number>},
 "feedback": "2-4 sentences grounded in the scoring and the criteria",
 "criteria_feedback": [{"criterion": "<selected criterion>", "feedback": "<assessment>"}],
 "recommendations": ["<concrete suggestion>"]}
</verdict>

- "criteria_feedback" must contain one entry for every selected evaluation criterion, using its exact name.
- If CON wins, give exactly 3 concrete, constructive recommendations that would let the thesis win next time. Otherwise recommendations may be empty."#
    }

    /// Build the adjudication prompt
    pub fn build_adjudication_prompt(
        thesis: &str,
        criteria: &[String],
        references: &str,
        transcript: &str,
    ) -> String {
        let criteria_list = criteria
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"## Thesis
{thesis}

## Selected Evaluation Criteria
{criteria}

## Initial References
{references}

## Debate Transcript
{transcript}

---

Judge the debate according to the scoring protocol and finish with the verdict block."#,
            thesis = thesis,
            criteria = criteria_list,
            references = references,
            transcript = transcript,
        )
    }
}
