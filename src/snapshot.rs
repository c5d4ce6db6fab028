//! Plain serde records for everything the save files must carry. The model
//! types keep their fields private; these are the only shapes that touch
//! disk, and restoring from them goes through the model's override setters.

use crate::parental::ParentalSettings;
use crate::pet::Pet;
use crate::species::Species;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSnapshot {
    pub name: String,
    pub species: Species,
    pub health: u32,
    pub happiness: u32,
    pub fullness: u32,
    pub sleep: u32,
    pub is_sleeping: bool,
    pub is_hungry: bool,
    pub is_angry: bool,
    pub is_dead: bool,
}

impl From<&Pet> for PetSnapshot {
    fn from(pet: &Pet) -> Self {
        let v = pet.vitals();
        let f = pet.flags();
        Self {
            name: pet.name().to_string(),
            species: pet.species(),
            health: v.health,
            happiness: v.happiness,
            fullness: v.fullness,
            sleep: v.sleep,
            is_sleeping: f.sleeping,
            is_hungry: f.hungry,
            is_angry: f.angry,
            is_dead: f.dead,
        }
    }
}

impl PetSnapshot {
    /// Rebuilds the pet verbatim: a dead pet stays dead and a sleeping pet
    /// stays asleep, whatever its stats say.
    pub fn restore(&self) -> Pet {
        let mut pet = Pet::new(self.name.clone(), self.species);
        pet.set_health(i64::from(self.health));
        pet.set_happiness(i64::from(self.happiness));
        pet.set_fullness(i64::from(self.fullness));
        pet.set_sleep(i64::from(self.sleep));
        pet.set_sleeping(self.is_sleeping);
        pet.set_hungry(self.is_hungry);
        pet.set_angry(self.is_angry);
        pet.set_dead(self.is_dead);
        pet
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub name: String,
    pub value: u32,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub player_name: String,
    pub score: i32,
    pub total_play_ms: i64,
    #[serde(default)]
    pub session_count: u32,
    pub last_played_at: DateTime<Utc>,
    pub last_vet_at: DateTime<Utc>,
    pub pet: Option<PetSnapshot>,
    #[serde(default)]
    pub food: Vec<StockSnapshot>,
    #[serde(default)]
    pub gifts: Vec<StockSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentalSnapshot {
    pub restriction_enabled: bool,
    pub allowed_start: Option<NaiveTime>,
    pub allowed_end: Option<NaiveTime>,
    pub total_play_ms: i64,
    pub session_count: u32,
    #[serde(default)]
    pub last_session_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_session_end: Option<DateTime<Utc>>,
}

impl From<&ParentalSettings> for ParentalSnapshot {
    fn from(s: &ParentalSettings) -> Self {
        Self {
            restriction_enabled: s.restriction_enabled(),
            allowed_start: s.allowed_start(),
            allowed_end: s.allowed_end(),
            total_play_ms: s.total_play_time().num_milliseconds(),
            session_count: s.session_count(),
            last_session_start: s.last_session_start(),
            last_session_end: s.last_session_end(),
        }
    }
}

impl ParentalSnapshot {
    pub fn restore(&self) -> ParentalSettings {
        let mut s = ParentalSettings::with_default_window(NaiveTime::MIN);
        s.set_restriction_enabled(self.restriction_enabled);
        s.set_allowed_start(self.allowed_start);
        s.set_allowed_end(self.allowed_end);
        s.set_total_play_time(ChronoDuration::milliseconds(self.total_play_ms));
        s.set_session_count(self.session_count);
        s.set_last_session_start(self.last_session_start);
        s.set_last_session_end(self.last_session_end);
        s
    }
}
