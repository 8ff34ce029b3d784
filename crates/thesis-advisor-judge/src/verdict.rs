use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Winner of the debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Winner {
    Pro,
    Con,
    Tie,
}

impl TryFrom<String> for Winner {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Winner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase().as_str() {
            "pro" => Ok(Winner::Pro),
            "con" => Ok(Winner::Con),
            "tie" | "draw" => Ok(Winner::Tie),
            other => Err(format!("Unknown winner: {}", other)),
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Pro => write!(f, "PRO"),
            Winner::Con => write!(f, "CON"),
            Winner::Tie => write!(f, "TIE"),
        }
    }
}

/// Aggregate score per side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub pro: f64,
    pub con: f64,
}

/// Judge's comment on one selected criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionFeedback {
    pub criterion: String,
    pub feedback: String,
}

/// The adjudicator's final, terminal output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Winner,
    pub scores: Scores,
    /// Overall justification
    pub feedback: String,
    #[serde(default)]
    pub criteria_feedback: Vec<CriterionFeedback>,
    /// Suggestions to strengthen the thesis
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Error, Debug)]
pub enum VerdictParseError {
    #[error("No verdict found in judge output")]
    NoVerdictFound,

    #[error("Failed to parse verdict JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid verdict format: {0}")]
    InvalidFormat(String),
}

impl Verdict {
    /// Parse the verdict from the judge's output text
    ///
    /// Expected format:
    /// ```text
    /// <verdict>
    /// {"winner": "pro", "scores": {"pro": 31.5, "con": 27.0}, "feedback": "...",
    ///  "criteria_feedback": [{"criterion": "...", "feedback": "..."}],
    ///  "recommendations": ["..."]}
    /// </verdict>
    /// ```
    /// Falls back to the line format (`AGGREGATE: PRO=.., CON=..`,
    /// `WINNER: ..`, `JUSTIFICATION: ..`).
    pub fn parse(judge_output: &str) -> Result<Self, VerdictParseError> {
        debug!(output_len = judge_output.len(), "Parsing verdict");

        let verdict = match Self::parse_verdict_block(judge_output)? {
            Some(verdict) => verdict,
            None => Self::parse_line_format(judge_output)?,
        };
        verdict.validate()?;
        Ok(verdict)
    }

    fn parse_verdict_block(output: &str) -> Result<Option<Self>, VerdictParseError> {
        const OPEN: &str = "<verdict>";
        const CLOSE: &str = "</verdict>";

        match (output.find(OPEN), output.rfind(CLOSE)) {
            (Some(start), Some(end)) if start < end => {
                let json_str = strip_code_fence(output[start + OPEN.len()..end].trim());
                debug!(json = json_str, "Found verdict block");
                Ok(Some(serde_json::from_str(json_str)?))
            }
            (Some(_), Some(_)) => Err(VerdictParseError::InvalidFormat(
                "Malformed verdict block".to_string(),
            )),
            _ => Ok(None),
        }
    }

    fn parse_line_format(output: &str) -> Result<Self, VerdictParseError> {
        let mut scores = None;
        let mut winner = None;
        let mut justification = String::new();
        let mut recommendations = Vec::new();
        let mut in_recommendations = false;

        for line in output.lines().map(str::trim) {
            // Labels may arrive as markdown: `**WINNER:** PRO`, `### AGGREGATE: ...`
            let bare = line.trim_start_matches(|c: char| is_markdown(c) || c.is_whitespace());
            let upper = bare.to_uppercase();
            if let Some(rest) = strip_label(bare, &upper, "AGGREGATE:") {
                scores = Some(parse_aggregate(rest)?);
                in_recommendations = false;
            } else if let Some(rest) = strip_label(bare, &upper, "WINNER:") {
                winner = Some(
                    first_word(rest)
                        .parse::<Winner>()
                        .map_err(VerdictParseError::InvalidFormat)?,
                );
                in_recommendations = false;
            } else if let Some(rest) = strip_label(bare, &upper, "JUSTIFICATION:") {
                justification = rest.trim().to_string();
                in_recommendations = false;
            } else if upper.starts_with("RECOMMENDATIONS") || upper.starts_with("SUGGESTIONS") {
                in_recommendations = true;
            } else if in_recommendations && !line.is_empty() {
                let item = line
                    .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-' || c == '*' || c == ')')
                    .trim();
                if !item.is_empty() {
                    recommendations.push(item.to_string());
                }
            }
        }

        match (winner, scores) {
            (Some(winner), Some(scores)) => Ok(Verdict {
                winner,
                scores,
                feedback: justification,
                criteria_feedback: Vec::new(),
                recommendations,
            }),
            _ => Err(VerdictParseError::NoVerdictFound),
        }
    }

    fn validate(&self) -> Result<(), VerdictParseError> {
        for (side, score) in [("pro", self.scores.pro), ("con", self.scores.con)] {
            if !score.is_finite() || score < 0.0 {
                return Err(VerdictParseError::InvalidFormat(format!(
                    "{} score out of range: {}",
                    side, score
                )));
            }
        }
        Ok(())
    }

    /// Selected criteria the judge did not comment on
    pub fn missing_criteria<'c>(&self, criteria: &'c [String]) -> Vec<&'c str> {
        criteria
            .iter()
            .filter(|c| {
                !self
                    .criteria_feedback
                    .iter()
                    .any(|f| f.criterion.eq_ignore_ascii_case(c))
            })
            .map(String::as_str)
            .collect()
    }

    /// Get a short description of the verdict for logging
    pub fn short_description(&self) -> String {
        format!(
            "{} (PRO {:.1} / CON {:.1})",
            self.winner, self.scores.pro, self.scores.con
        )
    }
}

fn strip_label<'l>(line: &'l str, upper: &str, label: &str) -> Option<&'l str> {
    if upper.starts_with(label) {
        line.get(label.len()..)
            .map(|rest| rest.trim_matches(|c: char| is_markdown(c) || c.is_whitespace()))
    } else {
        None
    }
}

fn is_markdown(c: char) -> bool {
    matches!(c, '*' | '#' | '_' | '>' | '`')
}

/// `PRO (narrowly)` -> `PRO`
fn first_word(rest: &str) -> &str {
    rest.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .find(|w| !w.is_empty())
        .unwrap_or("")
}

fn strip_code_fence(s: &str) -> &str {
    let s = s.strip_prefix("```json").or_else(|| s.strip_prefix("```")).unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// `PRO=<n>, CON=<n>`
fn parse_aggregate(rest: &str) -> Result<Scores, VerdictParseError> {
    let mut pro = None;
    let mut con = None;
    for pair in rest.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value: f64 = value.trim().parse().map_err(|_| {
            VerdictParseError::InvalidFormat(format!("Bad score: {}", value.trim()))
        })?;
        match key.trim().to_uppercase().as_str() {
            "PRO" => pro = Some(value),
            "CON" => con = Some(value),
            _ => {}
        }
    }
    match (pro, con) {
        (Some(pro), Some(con)) => Ok(Scores { pro, con }),
        _ => Err(VerdictParseError::InvalidFormat(format!(
            "AGGREGATE line missing a side: {}",
            rest.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_block() {
        let output = r#"
Round-by-round the PRO side was better evidenced.

<verdict>
{"winner": "PRO", "scores": {"pro": 31.5, "con": 27.0}, "feedback": "PRO grounded claims in the references.",
 "criteria_feedback": [{"criterion": "Research Feasibility", "feedback": "Convincing plan."}],
 "recommendations": []}
</verdict>
"#;

        let verdict = Verdict::parse(output).unwrap();
        assert_eq!(verdict.winner, Winner::Pro);
        assert!((verdict.scores.pro - 31.5).abs() < 0.001);
        assert_eq!(verdict.criteria_feedback.len(), 1);
        assert_eq!(verdict.short_description(), "PRO (PRO 31.5 / CON 27.0)");
    }

    #[test]
    fn test_parse_fenced_block() {
        let output = "<verdict>\n```json\n{\"winner\": \"tie\", \"scores\": {\"pro\": 20, \"con\": 20}, \"feedback\": \"Even.\"}\n```\n</verdict>";
        let verdict = Verdict::parse(output).unwrap();
        assert_eq!(verdict.winner, Winner::Tie);
    }

    #[test]
    fn test_parse_line_format() {
        let output = r#"RoundScores:
Round 1: OPENING_PRO=7, REBUTTAL_PRO=6, OPENING_CON=8, REBUTTAL_CON=7

AGGREGATE: PRO=25.4, CON=28.1
WINNER: CON
JUSTIFICATION: CON exposed a feasibility gap.
Recommendations:
1. Narrow the cohort.
2. Add an ethics review plan.
"#;
        let verdict = Verdict::parse(output).unwrap();
        assert_eq!(verdict.winner, Winner::Con);
        assert!((verdict.scores.con - 28.1).abs() < 0.001);
        assert_eq!(verdict.feedback, "CON exposed a feasibility gap.");
        assert_eq!(
            verdict.recommendations,
            vec!["Narrow the cohort.", "Add an ethics review plan."]
        );
    }

    #[test]
    fn test_parse_markdown_line_format() {
        let output = r#"### Final Tally
**AGGREGATE:** PRO=24, CON=21.5
**WINNER:** PRO (narrowly, on feasibility)
**JUSTIFICATION:** PRO grounded its closing in the fetched cohort study.
"#;
        let verdict = Verdict::parse(output).unwrap();
        assert_eq!(verdict.winner, Winner::Pro);
        assert!((verdict.scores.con - 21.5).abs() < 0.001);
        assert_eq!(
            verdict.feedback,
            "PRO grounded its closing in the fetched cohort study."
        );
        assert!(verdict.criteria_feedback.is_empty());
    }

    #[test]
    fn test_parse_no_verdict() {
        let result = Verdict::parse("Both sides argued well.");
        assert!(matches!(result, Err(VerdictParseError::NoVerdictFound)));
    }

    #[test]
    fn test_negative_score_rejected() {
        let output = r#"<verdict>{"winner": "pro", "scores": {"pro": -1, "con": 2}, "feedback": ""}</verdict>"#;
        assert!(matches!(
            Verdict::parse(output),
            Err(VerdictParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unknown_winner_rejected() {
        let output = r#"<verdict>{"winner": "judge", "scores": {"pro": 1, "con": 2}, "feedback": ""}</verdict>"#;
        assert!(matches!(
            Verdict::parse(output),
            Err(VerdictParseError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_missing_criteria() {
        let verdict = Verdict {
            winner: Winner::Pro,
            scores: Scores { pro: 1.0, con: 0.5 },
            feedback: String::new(),
            criteria_feedback: vec![CriterionFeedback {
                criterion: "research feasibility".into(),
                feedback: "ok".into(),
            }],
            recommendations: vec![],
        };
        let criteria = vec![
            "Research Feasibility".to_string(),
            "Ethical Considerations".to_string(),
        ];
        assert_eq!(verdict.missing_criteria(&criteria), vec!["Ethical Considerations"]);
    }
}
