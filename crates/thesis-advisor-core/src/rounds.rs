use serde::{Deserialize, Serialize};

/// The five fixed debate stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Round {
    Opening,
    Rebuttal,
    Deepen,
    SecondRebuttal,
    Closing,
}

/// Per-round rules. All round-dependent behaviour reads from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundDescriptor {
    pub round: Round,
    pub number: u8,
    pub label: &'static str,
    /// Whether the literature search tool is declared for this round
    pub search_enabled: bool,
    /// How many of the opponent's immediately preceding rounds are visible
    pub opponent_window: usize,
    /// Instruction appended to the persona's turn prompt
    pub directive: &'static str,
}

pub const ROUND_TABLE: [RoundDescriptor; 5] = [
    RoundDescriptor {
        round: Round::Opening,
        number: 1,
        label: "Opening",
        search_enabled: false,
        opponent_window: 0,
        directive: "Present your opening case. Cite only the initial references listed above. \
                    Address the selected evaluation criteria in 3 to 4 focused points.",
    },
    RoundDescriptor {
        round: Round::Rebuttal,
        number: 2,
        label: "Rebuttal",
        search_enabled: false,
        opponent_window: 1,
        directive: "Rebut the claims of your opponent's opening shown above. \
                    Do not introduce new evidence.",
    },
    RoundDescriptor {
        round: Round::Deepen,
        number: 3,
        label: "Deepen",
        search_enabled: true,
        opponent_window: 1,
        directive: "Rebut your opponent's round 2 argument shown above AND strengthen your own case. \
                    You may call the search_literature tool to fetch new references from PubMed or Google Scholar.",
    },
    RoundDescriptor {
        round: Round::SecondRebuttal,
        number: 4,
        label: "Rebuttal",
        search_enabled: false,
        opponent_window: 1,
        directive: "Rebut only your opponent's round 3 argument shown above.",
    },
    RoundDescriptor {
        round: Round::Closing,
        number: 5,
        label: "Closing",
        search_enabled: true,
        opponent_window: 0,
        directive: "Give your final, independent closing case. Do not rebut or mention your opponent at all. \
                    You may call the search_literature tool to fetch new references from PubMed or Google Scholar.",
    },
];

impl Round {
    pub const ALL: [Round; 5] = [
        Round::Opening,
        Round::Rebuttal,
        Round::Deepen,
        Round::SecondRebuttal,
        Round::Closing,
    ];

    pub fn descriptor(self) -> &'static RoundDescriptor {
        &ROUND_TABLE[self as usize]
    }

    pub fn number(self) -> u8 {
        self.descriptor().number
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    pub fn search_enabled(self) -> bool {
        self.descriptor().search_enabled
    }

    pub fn from_number(number: u8) -> Option<Round> {
        Round::ALL.into_iter().find(|r| r.number() == number)
    }

    pub fn previous(self) -> Option<Round> {
        Round::from_number(self.number().checked_sub(1)?)
    }

    /// Opponent rounds visible from this round, oldest first
    pub fn visible_opponent_rounds(self) -> Vec<Round> {
        let window = self.descriptor().opponent_window as u8;
        let first = self.number().saturating_sub(window);
        (first..self.number()).filter_map(Round::from_number).collect()
    }
}

impl From<Round> for u8 {
    fn from(round: Round) -> Self {
        round.number()
    }
}

impl TryFrom<u8> for Round {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Round::from_number(value).ok_or_else(|| format!("Round out of range: {}", value))
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Round {} ({})", self.number(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_round() {
        for (i, round) in Round::ALL.into_iter().enumerate() {
            assert_eq!(round.descriptor().round, round);
            assert_eq!(round.number() as usize, i + 1);
        }
    }

    #[test]
    fn test_search_only_in_deepen_and_closing() {
        let enabled: Vec<u8> = Round::ALL
            .into_iter()
            .filter(|r| r.search_enabled())
            .map(Round::number)
            .collect();
        assert_eq!(enabled, vec![3, 5]);
    }

    #[test]
    fn test_visible_opponent_rounds() {
        assert!(Round::Opening.visible_opponent_rounds().is_empty());
        assert_eq!(Round::Rebuttal.visible_opponent_rounds(), vec![Round::Opening]);
        assert_eq!(Round::Deepen.visible_opponent_rounds(), vec![Round::Rebuttal]);
        assert_eq!(Round::SecondRebuttal.visible_opponent_rounds(), vec![Round::Deepen]);
        assert!(Round::Closing.visible_opponent_rounds().is_empty());
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Round::Deepen).unwrap(), "3");
        let round: Round = serde_json::from_str("5").unwrap();
        assert_eq!(round, Round::Closing);
        assert!(serde_json::from_str::<Round>("6").is_err());
    }
}
