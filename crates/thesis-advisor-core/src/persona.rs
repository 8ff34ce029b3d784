use serde::{Deserialize, Serialize};
use thesis_advisor_logging::Speaker;

/// One of the two debate roles. The derived ordering is the canonical
/// transcript order: PRO before CON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Persona {
    Pro,
    Con,
}

impl Persona {
    pub const CANONICAL: [Persona; 2] = [Persona::Pro, Persona::Con];

    pub fn opponent(self) -> Persona {
        match self {
            Persona::Pro => Persona::Con,
            Persona::Con => Persona::Pro,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Persona::Pro => "PRO",
            Persona::Con => "CON",
        }
    }

    /// Fixed argumentative stance
    pub fn stance(self) -> &'static str {
        match self {
            Persona::Pro => {
                "You argue FOR the thesis: show that it is a strong, worthwhile and feasible thesis topic."
            }
            Persona::Con => {
                "You argue AGAINST the thesis: expose its weaknesses, risks and gaps as a thesis topic."
            }
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Persona> for Speaker {
    fn from(persona: Persona) -> Self {
        match persona {
            Persona::Pro => Speaker::Pro,
            Persona::Con => Speaker::Con,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_ordering() {
        let mut personas = vec![Persona::Con, Persona::Pro];
        personas.sort();
        assert_eq!(personas, Persona::CANONICAL.to_vec());
    }

    #[test]
    fn test_opponent_is_involution() {
        for persona in Persona::CANONICAL {
            assert_ne!(persona.opponent(), persona);
            assert_eq!(persona.opponent().opponent(), persona);
        }
    }
}
