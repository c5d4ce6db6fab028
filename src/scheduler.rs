//! Drives the pet's periodic decay and its gradual sleep recovery.
//!
//! The scheduler owns no clock. The host feeds it elapsed time and it fires
//! every due timer in chronological order, the same fixed-step accumulation
//! whether the time came from a frame loop or from an offline gap.

use crate::config::Rules;
use crate::pet::{DecayReport, Pet};
use chrono::Duration as ChronoDuration;
use std::time::Duration;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub decay_ticks: u64,
    pub recovery_ticks: u64,
    pub fell_asleep: u32,
    pub woke_up: u32,
    pub became_hungry: bool,
    pub became_angry: bool,
    pub died: bool,
}

impl SchedulerReport {
    fn record_decay(&mut self, r: DecayReport) {
        self.decay_ticks += 1;
        if r.fell_asleep {
            self.fell_asleep += 1;
        }
        self.became_hungry |= r.became_hungry;
        self.became_angry |= r.became_angry;
        self.died |= r.died;
    }

    /// Worth telling the player about.
    pub fn has_anything(&self) -> bool {
        self.fell_asleep > 0
            || self.woke_up > 0
            || self.became_hungry
            || self.became_angry
            || self.died
    }
}

#[derive(Clone, Debug)]
pub struct DeclineScheduler {
    decay_period: Duration,
    recovery_period: Duration,
    recovery_step: u32,
    until_decay: Duration,
    /// Armed only while the pet sleeps.
    until_recovery: Option<Duration>,
    /// Sleep episode the recovery countdown belongs to.
    armed_episode: u32,
    stopped: bool,
}

impl DeclineScheduler {
    pub fn new(decay_period: Duration, recovery_period: Duration, recovery_step: u32) -> Self {
        let decay_period = decay_period.max(MIN_PERIOD);
        Self {
            decay_period,
            recovery_period: recovery_period.max(MIN_PERIOD),
            recovery_step: recovery_step.max(1),
            until_decay: decay_period,
            until_recovery: None,
            armed_episode: 0,
            stopped: false,
        }
    }

    pub fn from_rules(rules: &Rules) -> Self {
        Self::new(
            rules.decay_interval(),
            rules.sleep_recovery_interval(),
            rules.sleep_recovery_step(),
        )
    }

    /// Cancels both timers for good; later `advance` calls do nothing.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.until_recovery = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Time until the next decay tick.
    pub fn next_decay_in(&self) -> Duration {
        self.until_decay
    }

    /// The countdown restarts with every new sleep episode, including one
    /// that began and ended between two `advance` calls.
    fn sync_recovery(&mut self, pet: &Pet) {
        let wants = pet.is_sleeping() && !pet.is_dead();
        match (wants, self.until_recovery) {
            (true, Some(_)) if self.armed_episode == pet.sleep_episode() => {}
            (true, _) => {
                self.until_recovery = Some(self.recovery_period);
                self.armed_episode = pet.sleep_episode();
            }
            (false, Some(_)) => self.until_recovery = None,
            (false, None) => {}
        }
    }

    pub fn advance(&mut self, pet: &mut Pet, elapsed: Duration) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        let mut left = elapsed;

        while !self.stopped && !pet.is_dead() {
            self.sync_recovery(pet);
            let next = match self.until_recovery {
                Some(r) => r.min(self.until_decay),
                None => self.until_decay,
            };
            if next > left {
                self.until_decay -= left;
                if let Some(r) = self.until_recovery.as_mut() {
                    *r -= left;
                }
                break;
            }
            left -= next;
            self.until_decay -= next;
            if let Some(r) = self.until_recovery.as_mut() {
                *r -= next;
            }

            // Decay first: it is a no-op for a sleeping pet, so the two
            // timers never both change stats in one step.
            if self.until_decay.is_zero() {
                self.until_decay = self.decay_period;
                let tick = pet.decay_tick();
                report.record_decay(tick);
                log_decay(pet, tick);
            }
            if self.until_recovery == Some(Duration::ZERO) {
                self.until_recovery = Some(self.recovery_period);
                report.recovery_ticks += 1;
                if pet.recover_sleep(self.recovery_step) {
                    report.woke_up += 1;
                    tracing::info!(pet = pet.name(), "woke up fully rested");
                }
            }
        }

        report
    }

    /// Simulates time spent away, clamped to `[0, max]`.
    pub fn catch_up(
        &mut self,
        pet: &mut Pet,
        away: ChronoDuration,
        max: ChronoDuration,
    ) -> SchedulerReport {
        let away = away.clamp(ChronoDuration::zero(), max.max(ChronoDuration::zero()));
        let away = away.to_std().unwrap_or(Duration::ZERO);
        if away.is_zero() {
            return SchedulerReport::default();
        }
        tracing::debug!(secs = away.as_secs(), "catching up on time away");
        self.advance(pet, away)
    }
}

fn log_decay(pet: &Pet, tick: DecayReport) {
    if !tick.applied {
        return;
    }
    let v = pet.vitals();
    tracing::debug!(
        pet = pet.name(),
        health = v.health,
        sleep = v.sleep,
        fullness = v.fullness,
        happiness = v.happiness,
        "decay tick"
    );
    if tick.fell_asleep {
        tracing::info!(pet = pet.name(), "collapsed from exhaustion");
    }
    if tick.became_hungry {
        tracing::info!(pet = pet.name(), "is starving");
    }
    if tick.became_angry {
        tracing::info!(pet = pet.name(), "is angry");
    }
    if tick.died {
        tracing::warn!(pet = pet.name(), "has died");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn sched() -> DeclineScheduler {
        DeclineScheduler::new(secs(10), secs(1), 1)
    }

    #[test]
    fn decay_fires_once_per_period() {
        let mut pet = Pet::new("Rex", Species::Dog);
        let mut s = sched();
        assert_eq!(s.advance(&mut pet, secs(9)).decay_ticks, 0);
        assert_eq!(pet.sleep_level(), 100);
        assert_eq!(s.advance(&mut pet, secs(1)).decay_ticks, 1);
        assert_eq!(pet.sleep_level(), 98);
        let r = s.advance(&mut pet, secs(35));
        assert_eq!(r.decay_ticks, 3);
        assert_eq!(s.next_decay_in(), secs(5));
        assert_eq!(pet.fullness(), 100 - 4 * 3);
    }

    #[test]
    fn recovery_runs_only_while_asleep_and_wakes_at_max() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_sleep(95);
        let mut s = sched();
        let r = s.advance(&mut pet, secs(3));
        assert_eq!(r.recovery_ticks, 0);

        pet.sleep();
        let r = s.advance(&mut pet, secs(4));
        assert_eq!(r.recovery_ticks, 4);
        assert_eq!(pet.sleep_level(), 99);
        assert!(pet.is_sleeping());

        let r = s.advance(&mut pet, secs(1));
        assert_eq!(r.woke_up, 1);
        assert!(!pet.is_sleeping());
        assert_eq!(pet.sleep_level(), 100);

        let r = s.advance(&mut pet, secs(1));
        assert_eq!(r.recovery_ticks, 0);
    }

    #[test]
    fn recovery_countdown_restarts_for_a_new_nap() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_sleep(50);
        pet.sleep();
        let mut s = sched();
        assert_eq!(s.advance(&mut pet, Duration::from_millis(600)).recovery_ticks, 0);

        pet.wake_up();
        pet.set_sleep(50);
        pet.sleep();
        let r = s.advance(&mut pet, Duration::from_millis(600));
        assert_eq!(r.recovery_ticks, 0);
        assert_eq!(pet.sleep_level(), 50);

        let r = s.advance(&mut pet, Duration::from_millis(400));
        assert_eq!(r.recovery_ticks, 1);
        assert_eq!(pet.sleep_level(), 51);
    }

    #[test]
    fn zero_recovery_step_still_wakes_the_pet() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_sleep(98);
        pet.sleep();
        let mut s = DeclineScheduler::new(secs(10), secs(1), 0);
        let r = s.advance(&mut pet, secs(2));
        assert_eq!(r.woke_up, 1);
        assert!(!pet.is_sleeping());
    }

    #[test]
    fn sleeping_pet_does_not_decay_while_recovering() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_sleep(0);
        pet.set_fullness(50);
        pet.sleep();
        let mut s = sched();
        let r = s.advance(&mut pet, secs(20));
        assert_eq!(r.decay_ticks, 2);
        assert_eq!(pet.fullness(), 50);
        assert_eq!(pet.sleep_level(), 20);
    }

    #[test]
    fn exhaustion_leads_to_sleep_then_recovery() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_sleep(2);
        let mut s = sched();
        let r = s.advance(&mut pet, secs(10));
        assert_eq!(r.fell_asleep, 1);
        assert!(pet.is_sleeping());
        assert_eq!(pet.health(), 90);
        s.advance(&mut pet, secs(100));
        assert!(!pet.is_sleeping());
        assert_eq!(pet.sleep_level(), 100);
    }

    #[test]
    fn dead_pet_stops_the_clock() {
        let mut pet = Pet::new("Rex", Species::Dog);
        pet.set_health(5);
        pet.set_fullness(1);
        let mut s = sched();
        let r = s.advance(&mut pet, secs(1_000));
        assert!(r.died);
        assert_eq!(r.decay_ticks, 1);
        assert!(pet.is_dead());
    }

    #[test]
    fn stopped_scheduler_ignores_time() {
        let mut pet = Pet::new("Rex", Species::Dog);
        let mut s = sched();
        s.stop();
        assert!(s.is_stopped());
        assert_eq!(s.advance(&mut pet, secs(100)), SchedulerReport::default());
        assert_eq!(pet.vitals(), pet.max_vitals());
    }

    #[test]
    fn catch_up_is_clamped() {
        let mut pet = Pet::new("Rex", Species::Dog);
        let mut s = sched();
        let r = s.catch_up(&mut pet, ChronoDuration::hours(5), ChronoDuration::seconds(30));
        assert_eq!(r.decay_ticks, 3);
        let r = s.catch_up(&mut pet, ChronoDuration::hours(-5), ChronoDuration::hours(1));
        assert_eq!(r, SchedulerReport::default());
        let r = s.catch_up(&mut pet, ChronoDuration::hours(5), ChronoDuration::zero());
        assert_eq!(r.decay_ticks, 0);
    }

    #[test]
    fn split_advances_match_one_big_advance() {
        let mut a = Pet::new("A", Species::Penguin);
        let mut b = a.clone();
        let mut sa = sched();
        let mut sb = sched();
        sa.advance(&mut a, secs(600));
        for _ in 0..600 {
            sb.advance(&mut b, secs(1));
        }
        assert_eq!(a, b);
    }
}
