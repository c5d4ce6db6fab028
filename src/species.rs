use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every adoptable kind of pet. Each variant carries its own maxima and
/// decline rates through [`Species::stats`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Dog,
    Deer,
    Frog,
    Jellyfish,
    Penguin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeciesStats {
    pub max_health: u32,
    pub max_sleep: u32,
    pub max_fullness: u32,
    pub max_happiness: u32,
    pub sleep_decline: u32,
    pub fullness_decline: u32,
    pub happiness_decline: u32,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Dog,
        Species::Deer,
        Species::Frog,
        Species::Jellyfish,
        Species::Penguin,
    ];

    pub const fn stats(self) -> SpeciesStats {
        match self {
            // balanced
            Species::Dog => SpeciesStats {
                max_health: 100,
                max_sleep: 100,
                max_fullness: 100,
                max_happiness: 100,
                sleep_decline: 2,
                fullness_decline: 3,
                happiness_decline: 2,
            },
            // lots of energy, hungry fast
            Species::Deer => SpeciesStats {
                max_health: 90,
                max_sleep: 120,
                max_fullness: 90,
                max_happiness: 100,
                sleep_decline: 1,
                fullness_decline: 4,
                happiness_decline: 2,
            },
            Species::Frog => SpeciesStats {
                max_health: 80,
                max_sleep: 90,
                max_fullness: 110,
                max_happiness: 100,
                sleep_decline: 2,
                fullness_decline: 1,
                happiness_decline: 3,
            },
            // sturdy but needy
            Species::Jellyfish => SpeciesStats {
                max_health: 120,
                max_sleep: 90,
                max_fullness: 90,
                max_happiness: 90,
                sleep_decline: 2,
                fullness_decline: 2,
                happiness_decline: 4,
            },
            Species::Penguin => SpeciesStats {
                max_health: 100,
                max_sleep: 80,
                max_fullness: 110,
                max_happiness: 110,
                sleep_decline: 3,
                fullness_decline: 2,
                happiness_decline: 1,
            },
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Species::Dog => "DOG",
            Species::Deer => "DEER",
            Species::Frog => "FROG",
            Species::Jellyfish => "JELLYFISH",
            Species::Penguin => "PENGUIN",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown species tag `{0}`")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Species::ALL
            .into_iter()
            .find(|sp| sp.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!("dog".parse::<Species>(), Ok(Species::Dog));
        assert_eq!(" Penguin ".parse::<Species>(), Ok(Species::Penguin));
        assert!("dragon".parse::<Species>().is_err());
    }

    #[test]
    fn serde_uses_upper_case_tags() {
        let json = serde_json::to_string(&Species::Jellyfish).unwrap();
        assert_eq!(json, "\"JELLYFISH\"");
        let back: Species = serde_json::from_str("\"DEER\"").unwrap();
        assert_eq!(back, Species::Deer);
    }

    #[test]
    fn every_species_declines() {
        for sp in Species::ALL {
            let st = sp.stats();
            assert!(st.sleep_decline > 0 && st.fullness_decline > 0 && st.happiness_decline > 0);
            assert_eq!(sp.tag().parse::<Species>(), Ok(sp));
        }
    }
}
