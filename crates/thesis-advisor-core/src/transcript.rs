use serde::{Deserialize, Serialize};
use thesis_advisor_literature::format_for_context;

use crate::{Persona, Round, RoundRecord, TranscriptError};

/// Records in a complete debate: five rounds, two personas
pub const EXPECTED_RECORDS: usize = Round::ALL.len() * Persona::CANONICAL.len();

/// Ordered record of the whole debate. Sole input to the adjudicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    records: Vec<RoundRecord>,
}

/// Order all round records by (round, persona) into a complete transcript.
///
/// Records are cloned unchanged. Fails unless there is exactly one record
/// per round and persona.
pub fn aggregate(records: &[RoundRecord]) -> Result<Transcript, TranscriptError> {
    if records.len() != EXPECTED_RECORDS {
        return Err(TranscriptError::WrongCount {
            expected: EXPECTED_RECORDS,
            actual: records.len(),
        });
    }

    let transcript = Transcript::partial(records);
    for pair in transcript.records.windows(2) {
        if pair[0].sort_key() == pair[1].sort_key() {
            return Err(TranscriptError::Duplicate {
                round: pair[0].round,
                persona: pair[0].persona,
            });
        }
    }
    Ok(transcript)
}

impl Transcript {
    /// Ordered view of whatever rounds completed, without the completeness check
    pub fn partial(records: &[RoundRecord]) -> Self {
        let mut records = records.to_vec();
        records.sort_by_key(RoundRecord::sort_key);
        Self { records }
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.records.len() == EXPECTED_RECORDS
    }

    pub fn failed_turns(&self) -> usize {
        self.records.iter().filter(|r| r.failed).count()
    }

    /// Text form for the judge. Search usage and fetched references are kept
    /// so evidence can be scored.
    pub fn render(&self) -> String {
        let mut blocks = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut header = format!(
                "[Round {} | {}] {}",
                record.round.number(),
                record.round.label(),
                record.persona
            );
            if record.failed {
                header.push_str(" FAILED");
            } else if record.used_search {
                header.push_str(&format!(
                    " (searched, {} new references)",
                    record.new_references.len()
                ));
            }

            let mut block = format!("{}:\n{}", header, record.text.trim());
            if !record.new_references.is_empty() {
                block.push_str("\nReferences fetched this round:\n");
                block.push_str(&format_for_context(&record.new_references));
            }
            blocks.push(block);
        }
        blocks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_advisor_literature::ReferenceRecord;

    fn full_debate_reversed() -> Vec<RoundRecord> {
        let mut records = Vec::new();
        for round in Round::ALL.into_iter().rev() {
            for persona in [Persona::Con, Persona::Pro] {
                let mut record =
                    RoundRecord::new(round, persona, format!("{}-R{}", persona, round.number()));
                if round == Round::Deepen && persona == Persona::Con {
                    record = record.with_search(vec![ReferenceRecord::new(
                        "Fetched paper",
                        "Doe",
                        "Abstract",
                        "https://example.org/fetched",
                    )]);
                }
                records.push(record);
            }
        }
        records
    }

    #[test]
    fn test_canonical_order() {
        let transcript = aggregate(&full_debate_reversed()).unwrap();
        let order: Vec<(u8, Persona)> = transcript
            .records()
            .iter()
            .map(|r| (r.round.number(), r.persona))
            .collect();

        let mut expected = Vec::new();
        for n in 1..=5 {
            expected.push((n, Persona::Pro));
            expected.push((n, Persona::Con));
        }
        assert_eq!(order, expected);
        assert!(transcript.is_complete());
    }

    #[test]
    fn test_idempotent_and_preserves_fields() {
        let input = full_debate_reversed();
        let once = aggregate(&input).unwrap();
        let twice = aggregate(once.records()).unwrap();
        assert_eq!(once, twice);

        let deepen_con = &once.records()[5];
        assert_eq!((deepen_con.round, deepen_con.persona), (Round::Deepen, Persona::Con));
        assert!(deepen_con.used_search);
        assert_eq!(deepen_con.new_references.len(), 1);
    }

    #[test]
    fn test_wrong_count_rejected() {
        let mut records = full_debate_reversed();
        records.pop();
        assert_eq!(
            aggregate(&records),
            Err(TranscriptError::WrongCount {
                expected: 10,
                actual: 9
            })
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut records = full_debate_reversed();
        records[0] = records[1].clone();
        assert!(matches!(
            aggregate(&records),
            Err(TranscriptError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_render_marks_failures_and_evidence() {
        let mut records = full_debate_reversed();
        let idx = records
            .iter()
            .position(|r| r.round == Round::SecondRebuttal && r.persona == Persona::Pro)
            .unwrap();
        records[idx] = RoundRecord::placeholder(Round::SecondRebuttal, Persona::Pro, "timeout");

        let rendered = aggregate(&records).unwrap().render();
        assert!(rendered.starts_with("[Round 1 | Opening] PRO:\nPRO-R1"));
        assert!(rendered.contains("[Round 4 | Rebuttal] PRO FAILED:"));
        assert!(rendered.contains("[Round 3 | Deepen] CON (searched, 1 new references):"));
        assert!(rendered.contains("Article 1: 'Fetched paper'"));
    }
}
