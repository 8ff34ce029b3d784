//! Terminal rendering of references, rounds and the final outcome.

use colored::Colorize;

use thesis_advisor_core::{Persona, RoundRecord, SessionOutcome, Transcript};
use thesis_advisor_judge::{Verdict, Winner};
use thesis_advisor_literature::{format_for_display, ConnectorKind, ReferenceRecord};

pub fn print_references(connector: ConnectorKind, records: &[ReferenceRecord]) {
    println!();
    println!("{}", format!("References from {}", connector).bold());
    println!();
    println!("{}", format_for_display(records));
}

/// Print one finished round: PRO then CON
pub fn print_round(pro: &RoundRecord, con: &RoundRecord) {
    let header = format!("── Round {} · {} ", pro.round.number(), pro.round.label());
    println!();
    println!("{}", header.bold());
    print_turn(pro);
    print_turn(con);
}

fn print_turn(record: &RoundRecord) {
    let name = match record.persona {
        Persona::Pro => record.persona.to_string().bright_cyan().bold(),
        Persona::Con => record.persona.to_string().bright_magenta().bold(),
    };
    println!();
    if record.failed {
        println!(
            "{} {}",
            name,
            format!(
                "✗ no argument ({})",
                record.error.as_deref().unwrap_or("unknown error")
            )
            .bright_red()
        );
        return;
    }

    if record.used_search {
        println!(
            "{} {}",
            name,
            format!("(searched, {} new references)", record.new_references.len()).dimmed()
        );
    } else {
        println!("{}", name);
    }
    println!("{}", record.text.trim());
    if !record.new_references.is_empty() {
        println!();
        println!("{}", format_for_display(&record.new_references).dimmed());
    }
}

pub fn print_transcript(transcript: &Transcript) {
    let records = transcript.records();
    for pair in records.chunks(2) {
        match pair {
            [pro, con] if pro.round == con.round => print_round(pro, con),
            _ => pair.iter().for_each(print_turn),
        }
    }
}

fn print_verdict(verdict: &Verdict, criteria: &[String]) {
    let winner = match verdict.winner {
        Winner::Pro => "PRO: the thesis holds up".bright_green().bold(),
        Winner::Con => "CON: the thesis needs work".bright_red().bold(),
        Winner::Tie => "TIE".bright_yellow().bold(),
    };
    println!();
    println!("{}", "=== VERDICT ===".bold());
    println!("Winner: {}", winner);
    println!(
        "Scores: PRO {:.1} / CON {:.1}",
        verdict.scores.pro, verdict.scores.con
    );
    println!();
    println!("{}", verdict.feedback.trim());

    if !verdict.criteria_feedback.is_empty() {
        println!();
        println!("{}", "Criteria".bold());
        for item in &verdict.criteria_feedback {
            println!("  {} {}", format!("{}:", item.criterion).bright_cyan(), item.feedback);
        }
    }
    if let Some(note) = missing_feedback_note(verdict, criteria) {
        println!();
        println!("{}", note.yellow());
    }

    if !verdict.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        for (i, rec) in verdict.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec);
        }
    }
}

/// Selected criteria the judge left without feedback, if any
fn missing_feedback_note(verdict: &Verdict, criteria: &[String]) -> Option<String> {
    let missing = verdict.missing_criteria(criteria);
    if missing.is_empty() {
        return None;
    }
    Some(format!(
        "The judge gave no per-criterion feedback for: {}",
        missing.join(", ")
    ))
}

pub fn print_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Judged {
            brief,
            verdict,
            total_duration_secs,
            ..
        } => {
            print_verdict(verdict, &brief.criteria.labels());
            eprintln!();
            eprintln!("Duration: {:.1}s", total_duration_secs);
        }
        SessionOutcome::JudgmentFailed {
            error,
            transcript,
            total_duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "=== JUDGMENT FAILED ===".bright_red().bold());
            eprintln!("No verdict could be produced: {}", error);
            eprintln!("Duration: {:.1}s", total_duration_secs);
            println!();
            println!("{}", "Full transcript".bold());
            print_transcript(transcript);
        }
        SessionOutcome::Interrupted {
            completed_rounds,
            transcript,
            total_duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("=== INTERRUPTED ===");
            eprintln!("User stopped after {} round(s)", completed_rounds);
            eprintln!("Duration: {:.1}s", total_duration_secs);
            if !transcript.is_empty() {
                println!();
                println!("{}", "Completed rounds".bold());
                print_transcript(transcript);
            }
        }
        SessionOutcome::Declined { reason } => {
            eprintln!();
            eprintln!("Session ended: {}", reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_advisor_judge::{CriterionFeedback, Scores};

    fn verdict(criteria_feedback: Vec<CriterionFeedback>) -> Verdict {
        Verdict {
            winner: Winner::Pro,
            scores: Scores { pro: 24.0, con: 21.5 },
            feedback: "PRO was better supported.".into(),
            criteria_feedback,
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_note_lists_criteria_without_feedback() {
        let criteria = vec!["Scope and Fit".to_string(), "Research Feasibility".to_string()];
        let partial = verdict(vec![CriterionFeedback {
            criterion: "Scope and Fit".into(),
            feedback: "Well scoped.".into(),
        }]);
        assert_eq!(
            missing_feedback_note(&partial, &criteria).unwrap(),
            "The judge gave no per-criterion feedback for: Research Feasibility"
        );

        // Line-format verdicts carry no per-criterion feedback at all
        let bare = verdict(Vec::new());
        assert!(missing_feedback_note(&bare, &criteria)
            .unwrap()
            .ends_with("Scope and Fit, Research Feasibility"));
    }

    #[test]
    fn test_no_note_when_every_criterion_is_covered() {
        let criteria = vec!["Scope and Fit".to_string()];
        let full = verdict(vec![CriterionFeedback {
            criterion: "scope and fit".into(),
            feedback: "Well scoped.".into(),
        }]);
        assert!(missing_feedback_note(&full, &criteria).is_none());
    }
}
