//! The pet stat model: four vitals, their species maxima, and the derived
//! sleeping/hungry/angry/dead flags.
//!
//! Nothing in here performs I/O or reads the clock. Timers live in
//! [`crate::scheduler`], rate limits in [`crate::cooldown`].

use crate::species::{Species, SpeciesStats};

pub const SLEEP_DEPRIVATION_HEALTH_PENALTY: u32 = 10;
pub const HUNGER_HEALTH_PENALTY: u32 = 5;
/// Extra happiness lost per tick while starving, as a multiple of the
/// species' normal happiness decline.
pub const HUNGER_HAPPINESS_MULTIPLIER: u32 = 2;
pub const VET_HEALING: u32 = 20;
pub const EXERCISE_SLEEP_COST: u32 = 10;
pub const EXERCISE_FULLNESS_COST: u32 = 5;
pub const EXERCISE_HEALTH_GAIN: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vitals {
    pub health: u32,
    pub sleep: u32,
    pub fullness: u32,
    pub happiness: u32,
}

impl Vitals {
    pub fn maxima(stats: &SpeciesStats) -> Self {
        Self {
            health: stats.max_health,
            sleep: stats.max_sleep,
            fullness: stats.max_fullness,
            happiness: stats.max_happiness,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PetFlags {
    pub sleeping: bool,
    pub hungry: bool,
    pub angry: bool,
    pub dead: bool,
}

/// What a single decay tick changed, for the host's logs and UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecayReport {
    /// False when the tick was suppressed (dead or asleep).
    pub applied: bool,
    pub fell_asleep: bool,
    pub became_hungry: bool,
    pub became_angry: bool,
    pub died: bool,
}

/// One step of derived-state re-evaluation after the stats have declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayCheck {
    Sleep,
    Fullness,
    Happiness,
    Health,
}

/// Evaluation order matters: the hunger penalty lowers happiness before the
/// anger check sees it, and health goes last so a penalty taken this tick can
/// kill the pet this tick.
pub const DECAY_CHECKS: [DecayCheck; 4] = [
    DecayCheck::Sleep,
    DecayCheck::Fullness,
    DecayCheck::Happiness,
    DecayCheck::Health,
];

impl DecayCheck {
    fn run(self, pet: &mut Pet, stats: &SpeciesStats) {
        let v = &mut pet.vitals;
        let f = &mut pet.flags;
        match self {
            DecayCheck::Sleep => {
                if v.sleep == 0 {
                    v.health = v.health.saturating_sub(SLEEP_DEPRIVATION_HEALTH_PENALTY);
                    if !f.sleeping {
                        pet.naps = pet.naps.wrapping_add(1);
                    }
                    f.sleeping = true;
                }
            }
            DecayCheck::Fullness => {
                if v.fullness == 0 {
                    f.hungry = true;
                    let extra = stats
                        .happiness_decline
                        .saturating_mul(HUNGER_HAPPINESS_MULTIPLIER);
                    v.happiness = v.happiness.saturating_sub(extra);
                    v.health = v.health.saturating_sub(HUNGER_HEALTH_PENALTY);
                } else {
                    f.hungry = false;
                }
            }
            DecayCheck::Happiness => f.angry = v.happiness == 0,
            DecayCheck::Health => {
                if v.health == 0 {
                    f.dead = true;
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pet {
    name: String,
    species: Species,
    vitals: Vitals,
    flags: PetFlags,
    /// Bumped each time the pet falls asleep. Runtime only: not saved and
    /// not part of equality.
    naps: u32,
}

impl PartialEq for Pet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.species == other.species
            && self.vitals == other.vitals
            && self.flags == other.flags
    }
}

impl Eq for Pet {}

impl Pet {
    pub fn new(name: impl Into<String>, species: Species) -> Self {
        Self {
            name: name.into(),
            species,
            vitals: Vitals::maxima(&species.stats()),
            flags: PetFlags::default(),
            naps: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn max_vitals(&self) -> Vitals {
        Vitals::maxima(&self.species.stats())
    }

    pub fn flags(&self) -> PetFlags {
        self.flags
    }

    pub fn health(&self) -> u32 {
        self.vitals.health
    }

    pub fn sleep_level(&self) -> u32 {
        self.vitals.sleep
    }

    pub fn fullness(&self) -> u32 {
        self.vitals.fullness
    }

    pub fn happiness(&self) -> u32 {
        self.vitals.happiness
    }

    pub fn is_dead(&self) -> bool {
        self.flags.dead
    }

    pub fn is_sleeping(&self) -> bool {
        self.flags.sleeping
    }

    pub fn is_hungry(&self) -> bool {
        self.flags.hungry
    }

    pub fn is_angry(&self) -> bool {
        self.flags.angry
    }

    /// Alive and awake: the precondition of every care action except
    /// `sleep` and `wake_up`.
    pub fn is_responsive(&self) -> bool {
        !self.flags.dead && !self.flags.sleeping
    }

    /// One periodic decline of sleep, fullness and happiness followed by the
    /// ordered [`DECAY_CHECKS`]. Suppressed entirely while dead or asleep.
    pub fn decay_tick(&mut self) -> DecayReport {
        if !self.is_responsive() {
            return DecayReport::default();
        }
        let stats = self.species.stats();
        self.vitals.sleep = self.vitals.sleep.saturating_sub(stats.sleep_decline);
        self.vitals.fullness = self.vitals.fullness.saturating_sub(stats.fullness_decline);
        self.vitals.happiness = self
            .vitals
            .happiness
            .saturating_sub(stats.happiness_decline);

        let before = self.flags;
        for check in DECAY_CHECKS {
            check.run(self, &stats);
        }

        DecayReport {
            applied: true,
            fell_asleep: !before.sleeping && self.flags.sleeping,
            became_hungry: !before.hungry && self.flags.hungry,
            became_angry: !before.angry && self.flags.angry,
            died: self.flags.dead,
        }
    }

    pub fn feed(&mut self, amount: u32) {
        if !self.is_responsive() {
            return;
        }
        let max = self.species.stats().max_fullness;
        self.vitals.fullness = raise(self.vitals.fullness, amount, max);
        self.flags.hungry = false;
    }

    pub fn give_gift(&mut self, amount: u32) {
        if !self.is_responsive() {
            return;
        }
        self.cheer_up(amount);
    }

    /// Happiness from a play session; behaves like a gift.
    pub fn play(&mut self, amount: u32) {
        if !self.is_responsive() {
            return;
        }
        self.cheer_up(amount);
    }

    fn cheer_up(&mut self, amount: u32) {
        let max = self.species.stats().max_happiness;
        self.vitals.happiness = raise(self.vitals.happiness, amount, max);
        self.flags.angry = false;
    }

    pub fn sleep(&mut self) {
        if self.flags.dead {
            return;
        }
        self.set_sleeping(true);
    }

    /// Identifies the current sleep episode; changes whenever the pet falls
    /// asleep again.
    pub fn sleep_episode(&self) -> u32 {
        self.naps
    }

    pub fn wake_up(&mut self) {
        if self.flags.dead {
            return;
        }
        self.vitals.sleep = self.species.stats().max_sleep;
        self.flags.sleeping = false;
    }

    pub fn exercise(&mut self) {
        if !self.is_responsive() {
            return;
        }
        let max = self.species.stats().max_health;
        self.vitals.sleep = self.vitals.sleep.saturating_sub(EXERCISE_SLEEP_COST);
        self.vitals.fullness = self.vitals.fullness.saturating_sub(EXERCISE_FULLNESS_COST);
        self.vitals.health = raise(self.vitals.health, EXERCISE_HEALTH_GAIN, max);
    }

    pub fn take_to_vet(&mut self) {
        if !self.is_responsive() {
            return;
        }
        let max = self.species.stats().max_health;
        self.vitals.health = raise(self.vitals.health, VET_HEALING, max);
    }

    /// Gradual rest while asleep. Returns true when this step woke the pet.
    pub fn recover_sleep(&mut self, step: u32) -> bool {
        if self.flags.dead || !self.flags.sleeping {
            return false;
        }
        let max = self.species.stats().max_sleep;
        self.vitals.sleep = raise(self.vitals.sleep, step, max);
        if self.vitals.sleep >= max {
            self.wake_up();
            return true;
        }
        false
    }

    /// Clears every flag and refills every vital, whatever the current state.
    pub fn revive(&mut self) {
        self.flags = PetFlags::default();
        self.vitals = self.max_vitals();
    }

    /// The last of the decay checks on its own, so a loader that forced the
    /// health value can derive death the same way a tick would.
    pub fn check_health(&mut self) {
        let stats = self.species.stats();
        DecayCheck::Health.run(self, &stats);
    }

    // Override setters. These exist for restoring persisted snapshots; the
    // values come from files, so they are clamped rather than trusted.

    pub fn set_health(&mut self, value: i64) {
        self.vitals.health = clamp_stat(value, self.species.stats().max_health);
    }

    pub fn set_sleep(&mut self, value: i64) {
        self.vitals.sleep = clamp_stat(value, self.species.stats().max_sleep);
    }

    pub fn set_fullness(&mut self, value: i64) {
        self.vitals.fullness = clamp_stat(value, self.species.stats().max_fullness);
    }

    pub fn set_happiness(&mut self, value: i64) {
        self.vitals.happiness = clamp_stat(value, self.species.stats().max_happiness);
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.flags.dead = dead;
    }

    pub fn set_sleeping(&mut self, sleeping: bool) {
        if sleeping && !self.flags.sleeping {
            self.naps = self.naps.wrapping_add(1);
        }
        self.flags.sleeping = sleeping;
    }

    pub fn set_hungry(&mut self, hungry: bool) {
        self.flags.hungry = hungry;
    }

    pub fn set_angry(&mut self, angry: bool) {
        self.flags.angry = angry;
    }
}

fn raise(current: u32, amount: u32, max: u32) -> u32 {
    current.saturating_add(amount).min(max)
}

fn clamp_stat(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> Pet {
        Pet::new("Rex", Species::Dog)
    }

    #[test]
    fn new_pet_starts_full_and_calm() {
        for sp in Species::ALL {
            let p = Pet::new("x", sp);
            assert_eq!(p.vitals(), p.max_vitals());
            assert_eq!(p.flags(), PetFlags::default());
        }
    }

    #[test]
    fn one_dog_tick_declines_by_species_rates() {
        let mut p = dog();
        let report = p.decay_tick();
        assert!(report.applied);
        assert_eq!(
            p.vitals(),
            Vitals {
                health: 100,
                sleep: 98,
                fullness: 97,
                happiness: 98
            }
        );
        assert_eq!(p.flags(), PetFlags::default());
    }

    #[test]
    fn running_out_of_sleep_forces_sleep_and_costs_health() {
        let mut p = dog();
        p.set_sleep(1);
        let report = p.decay_tick();
        assert_eq!(p.sleep_level(), 0);
        assert!(p.is_sleeping());
        assert!(report.fell_asleep);
        assert_eq!(p.health(), 100 - SLEEP_DEPRIVATION_HEALTH_PENALTY);
    }

    #[test]
    fn starving_compounds_happiness_loss() {
        let mut p = dog();
        p.set_fullness(1);
        p.set_happiness(50);
        let r = Species::Dog.stats().happiness_decline;
        let report = p.decay_tick();
        assert_eq!(p.fullness(), 0);
        assert!(p.is_hungry());
        assert!(report.became_hungry);
        assert_eq!(p.happiness(), 50 - 3 * r);
        assert_eq!(p.health(), 100 - HUNGER_HEALTH_PENALTY);
    }

    #[test]
    fn hunger_clears_once_fed_stat_is_positive_again() {
        let mut p = dog();
        p.set_fullness(0);
        p.set_hungry(true);
        p.set_fullness(50);
        p.decay_tick();
        assert!(!p.is_hungry());
    }

    #[test]
    fn hunger_penalty_can_make_pet_angry_same_tick() {
        let mut p = dog();
        p.set_fullness(1);
        p.set_happiness(6);
        p.decay_tick();
        assert_eq!(p.happiness(), 0);
        assert!(p.is_angry());
    }

    #[test]
    fn penalties_kill_within_the_same_tick() {
        let mut p = dog();
        p.set_health(15);
        p.set_sleep(1);
        p.set_fullness(1);
        let report = p.decay_tick();
        assert_eq!(p.health(), 0);
        assert!(p.is_dead());
        assert!(report.died);
    }

    #[test]
    fn sleeping_suppresses_every_decline() {
        let mut p = dog();
        p.set_fullness(1);
        p.sleep();
        let before = p.clone();
        let report = p.decay_tick();
        assert!(!report.applied);
        assert_eq!(p, before);
    }

    #[test]
    fn dead_pet_ignores_actions() {
        let mut p = dog();
        p.set_health(40);
        p.set_fullness(10);
        p.set_dead(true);
        let before = p.clone();
        p.feed(30);
        p.give_gift(30);
        p.play(30);
        p.exercise();
        p.take_to_vet();
        p.sleep();
        p.wake_up();
        assert!(!p.recover_sleep(5));
        assert_eq!(p.decay_tick(), DecayReport::default());
        assert_eq!(p, before);
    }

    #[test]
    fn feeding_and_gifting_cap_at_species_max() {
        let mut p = Pet::new("Pingu", Species::Penguin);
        p.set_fullness(100);
        p.set_happiness(10);
        p.set_hungry(true);
        p.set_angry(true);
        p.feed(50);
        p.give_gift(500);
        assert_eq!(p.fullness(), 110);
        assert_eq!(p.happiness(), 110);
        assert!(!p.is_hungry());
        assert!(!p.is_angry());
    }

    #[test]
    fn sleeping_pet_cannot_eat_or_exercise() {
        let mut p = dog();
        p.set_fullness(20);
        p.sleep();
        p.feed(20);
        p.exercise();
        p.take_to_vet();
        assert_eq!(p.fullness(), 20);
        assert_eq!(p.sleep_level(), 100);
    }

    #[test]
    fn wake_up_refills_sleep() {
        let mut p = dog();
        p.set_sleep(3);
        p.sleep();
        p.sleep();
        assert!(p.is_sleeping());
        p.wake_up();
        assert!(!p.is_sleeping());
        assert_eq!(p.sleep_level(), 100);
    }

    #[test]
    fn exercise_trades_rest_and_food_for_health() {
        let mut p = dog();
        p.set_health(50);
        p.exercise();
        assert_eq!(p.sleep_level(), 90);
        assert_eq!(p.fullness(), 95);
        assert_eq!(p.health(), 55);

        p.set_sleep(4);
        p.set_fullness(2);
        p.set_health(98);
        p.exercise();
        assert_eq!(p.sleep_level(), 0);
        assert_eq!(p.fullness(), 0);
        assert_eq!(p.health(), 100);
    }

    #[test]
    fn vet_heals_up_to_max() {
        let mut p = Pet::new("Bambi", Species::Deer);
        p.set_health(10);
        p.take_to_vet();
        assert_eq!(p.health(), 30);
        p.set_health(85);
        p.take_to_vet();
        assert_eq!(p.health(), 90);
    }

    #[test]
    fn recovery_wakes_at_max() {
        let mut p = dog();
        p.set_sleep(98);
        assert!(!p.recover_sleep(1), "awake pets do not recover");
        p.sleep();
        assert!(!p.recover_sleep(1));
        assert_eq!(p.sleep_level(), 99);
        assert!(p.recover_sleep(1));
        assert!(!p.is_sleeping());
        assert_eq!(p.sleep_level(), 100);
    }

    #[test]
    fn revive_resets_everything_and_is_idempotent() {
        let mut p = Pet::new("Jelly", Species::Jellyfish);
        p.set_health(0);
        p.set_sleep(3);
        p.set_dead(true);
        p.set_sleeping(true);
        p.set_hungry(true);
        p.set_angry(true);
        p.revive();
        let once = p.clone();
        p.revive();
        assert_eq!(p, once);
        assert_eq!(p.vitals(), p.max_vitals());
        assert_eq!(p.flags(), PetFlags::default());
    }

    #[test]
    fn setters_clamp_external_values() {
        let mut p = Pet::new("Hop", Species::Frog);
        p.set_health(-20);
        p.set_fullness(1_000);
        p.set_sleep(i64::MAX);
        p.set_happiness(i64::MIN);
        assert_eq!(p.health(), 0);
        assert_eq!(p.fullness(), 110);
        assert_eq!(p.sleep_level(), 90);
        assert_eq!(p.happiness(), 0);
    }

    #[test]
    fn check_health_derives_death() {
        let mut p = dog();
        p.check_health();
        assert!(!p.is_dead());
        p.set_health(0);
        p.check_health();
        assert!(p.is_dead());
    }
}
