//! Parental controls: an allowed wall-clock window for gameplay screens and
//! cumulative session statistics.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};

/// Sessions longer than this are assumed to be clock skew or a crash and
/// are not counted.
pub const MAX_SESSION_HOURS: i64 = 24;
pub const DEFAULT_WINDOW_HOURS: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    /// Anything where the pet is being played with.
    Gameplay,
    /// Menus, tutorial, the parental controls themselves.
    Unrestricted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentalSettings {
    restriction_enabled: bool,
    allowed_start: Option<NaiveTime>,
    allowed_end: Option<NaiveTime>,
    total_play_time: ChronoDuration,
    session_count: u32,
    last_session_start: Option<DateTime<Utc>>,
    last_session_end: Option<DateTime<Utc>>,
}

impl Default for ParentalSettings {
    fn default() -> Self {
        Self::with_default_window(chrono::Local::now().time())
    }
}

impl ParentalSettings {
    /// Restrictions off, window from `now` to two hours later (or 23:59 if
    /// that would cross midnight), all counters zero.
    pub fn with_default_window(now: NaiveTime) -> Self {
        let (mut end, wrapped) =
            now.overflowing_add_signed(ChronoDuration::hours(DEFAULT_WINDOW_HOURS));
        if wrapped != 0 {
            end = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        }
        Self {
            restriction_enabled: false,
            allowed_start: Some(now),
            allowed_end: Some(end),
            total_play_time: ChronoDuration::zero(),
            session_count: 0,
            last_session_start: None,
            last_session_end: None,
        }
    }

    pub fn restriction_enabled(&self) -> bool {
        self.restriction_enabled
    }

    pub fn set_restriction_enabled(&mut self, enabled: bool) {
        self.restriction_enabled = enabled;
    }

    pub fn allowed_start(&self) -> Option<NaiveTime> {
        self.allowed_start
    }

    pub fn set_allowed_start(&mut self, start: Option<NaiveTime>) {
        self.allowed_start = start;
    }

    pub fn allowed_end(&self) -> Option<NaiveTime> {
        self.allowed_end
    }

    pub fn set_allowed_end(&mut self, end: Option<NaiveTime>) {
        self.allowed_end = end;
    }

    pub fn total_play_time(&self) -> ChronoDuration {
        self.total_play_time
    }

    pub fn set_total_play_time(&mut self, total: ChronoDuration) {
        self.total_play_time = total.max(ChronoDuration::zero());
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn set_session_count(&mut self, count: u32) {
        self.session_count = count;
    }

    pub fn last_session_start(&self) -> Option<DateTime<Utc>> {
        self.last_session_start
    }

    pub fn set_last_session_start(&mut self, at: Option<DateTime<Utc>>) {
        self.last_session_start = at;
    }

    pub fn last_session_end(&self) -> Option<DateTime<Utc>> {
        self.last_session_end
    }

    pub fn set_last_session_end(&mut self, at: Option<DateTime<Utc>>) {
        self.last_session_end = at;
    }

    fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        if !self.restriction_enabled {
            return None;
        }
        Some((self.allowed_start?, self.allowed_end?))
    }

    /// Both bounds are inclusive. A start after the end means the window
    /// runs overnight.
    pub fn is_allowed_at(&self, now: NaiveTime) -> bool {
        match self.window() {
            None => true,
            Some((start, end)) if start <= end => start <= now && now <= end,
            Some((start, end)) => now >= start || now <= end,
        }
    }

    pub fn may_enter(&self, screen: ScreenKind, now: NaiveTime) -> bool {
        match screen {
            ScreenKind::Unrestricted => true,
            ScreenKind::Gameplay => self.is_allowed_at(now),
        }
    }

    /// Time left until the window closes, for a countdown display. `None`
    /// when nothing is restricting play or the window is already closed.
    pub fn time_remaining(&self, now: NaiveTime) -> Option<ChronoDuration> {
        let (_, end) = self.window()?;
        if !self.is_allowed_at(now) {
            return None;
        }
        let left = end.signed_duration_since(now);
        if left < ChronoDuration::zero() {
            Some(left + ChronoDuration::days(1))
        } else {
            Some(left)
        }
    }

    pub fn start_session(&mut self, now: DateTime<Utc>) {
        self.last_session_start = Some(now);
    }

    /// Closes the running session. Returns the duration that was counted, if
    /// any; over-long sessions are dropped but still close.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Option<ChronoDuration> {
        let start = self.last_session_start.take()?;
        self.last_session_end = Some(now);
        let length = now.signed_duration_since(start);
        self.add_session_time(length).then_some(length)
    }

    pub fn add_session_time(&mut self, length: ChronoDuration) -> bool {
        if length < ChronoDuration::zero() || length > ChronoDuration::hours(MAX_SESSION_HOURS) {
            tracing::warn!(
                seconds = length.num_seconds(),
                "discarding implausible play session"
            );
            return false;
        }
        self.total_play_time = self.total_play_time + length;
        self.session_count = self.session_count.saturating_add(1);
        true
    }

    pub fn current_session_duration(&self, now: DateTime<Utc>) -> ChronoDuration {
        self.last_session_start
            .map(|start| now.signed_duration_since(start).max(ChronoDuration::zero()))
            .unwrap_or_else(ChronoDuration::zero)
    }

    pub fn average_session_time(&self) -> ChronoDuration {
        if self.session_count == 0 {
            return ChronoDuration::zero();
        }
        let count = i32::try_from(self.session_count).unwrap_or(i32::MAX);
        self.total_play_time / count
    }

    /// Zeroes the statistics; the window configuration stays.
    pub fn reset_statistics(&mut self) {
        self.total_play_time = ChronoDuration::zero();
        self.session_count = 0;
    }
}

/// Free-standing form of [`ParentalSettings::is_allowed_at`].
pub fn is_allowed_now(settings: &ParentalSettings, now: NaiveTime) -> bool {
    settings.is_allowed_at(now)
}
