use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::fmt;

pub const DEFAULT_COOLDOWN_SECS: i64 = 5 * 60;

/// Actions that may only be used once per cooldown period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    Play,
    Vet,
}

impl fmt::Display for CooldownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooldownKind::Play => f.write_str("play"),
            CooldownKind::Vet => f.write_str("vet"),
        }
    }
}

/// Last-use timestamps for the rate-limited actions of one player.
///
/// Querying never records anything: callers check [`try_consume`], run the
/// action, and only then [`commit`], so an aborted action costs no cooldown.
///
/// [`try_consume`]: ActionCooldowns::try_consume
/// [`commit`]: ActionCooldowns::commit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCooldowns {
    cooldown: ChronoDuration,
    last_played_at: DateTime<Utc>,
    last_vet_at: DateTime<Utc>,
}

impl ActionCooldowns {
    /// Fresh session: both actions are immediately available.
    pub fn new(cooldown: ChronoDuration, now: DateTime<Utc>) -> Self {
        let cooldown = cooldown.max(ChronoDuration::zero());
        let ready_since = now
            .checked_sub_signed(cooldown)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            cooldown,
            last_played_at: ready_since,
            last_vet_at: ready_since,
        }
    }

    pub fn restore(
        cooldown: ChronoDuration,
        last_played_at: DateTime<Utc>,
        last_vet_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cooldown: cooldown.max(ChronoDuration::zero()),
            last_played_at,
            last_vet_at,
        }
    }

    pub fn cooldown(&self) -> ChronoDuration {
        self.cooldown
    }

    pub fn set_cooldown(&mut self, cooldown: ChronoDuration) {
        self.cooldown = cooldown.max(ChronoDuration::zero());
    }

    pub fn last_used(&self, kind: CooldownKind) -> DateTime<Utc> {
        match kind {
            CooldownKind::Play => self.last_played_at,
            CooldownKind::Vet => self.last_vet_at,
        }
    }

    /// Override for loaders.
    pub fn set_last_used(&mut self, kind: CooldownKind, at: DateTime<Utc>) {
        match kind {
            CooldownKind::Play => self.last_played_at = at,
            CooldownKind::Vet => self.last_vet_at = at,
        }
    }

    /// True when at least one full cooldown has elapsed since the last use.
    pub fn try_consume(&self, kind: CooldownKind, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_used(kind)) >= self.cooldown
    }

    pub fn commit(&mut self, kind: CooldownKind, now: DateTime<Utc>) {
        self.set_last_used(kind, now);
    }

    pub fn remaining(&self, kind: CooldownKind, now: DateTime<Utc>) -> ChronoDuration {
        let elapsed = now.signed_duration_since(self.last_used(kind));
        (self.cooldown - elapsed).max(ChronoDuration::zero())
    }
}
