/// The player's currency. Never negative, never above `i32::MAX`; all
/// arithmetic saturates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(i32);

impl Score {
    pub const MAX: i32 = i32::MAX;

    pub fn new(points: i32) -> Self {
        Self(points.max(0))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Raw set for loaders and rewards that overwrite the score; clamped.
    pub fn set(&mut self, points: i32) {
        self.0 = points.max(0);
    }

    /// Negative input is ignored.
    pub fn increment(&mut self, points: i32) {
        if points < 0 {
            return;
        }
        self.0 = self.0.saturating_add(points);
    }

    /// Floors at zero. Negative input is ignored, so this never raises the
    /// score.
    pub fn decrement(&mut self, points: i32) {
        if points < 0 {
            return;
        }
        self.0 = self.0.saturating_sub(points).max(0);
    }

    /// Deducts `cost` only when the whole amount is available.
    pub fn try_spend(&mut self, cost: i32) -> bool {
        if cost < 0 || self.0 < cost {
            return false;
        }
        self.0 -= cost;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 10)]
    #[case(100, 0, 100)]
    #[case(i32::MAX - 5, 10, i32::MAX)]
    #[case(i32::MAX, i32::MAX, i32::MAX)]
    #[case(50, -10, 50)]
    fn increment_saturates(#[case] start: i32, #[case] points: i32, #[case] expected: i32) {
        let mut s = Score::new(start);
        s.increment(points);
        assert_eq!(s.get(), expected);
    }

    #[rstest]
    #[case(100, 40, 60)]
    #[case(30, 50, 0)]
    #[case(0, 10, 0)]
    #[case(100, i32::MAX, 0)]
    #[case(50, -10, 50)]
    fn decrement_floors(#[case] start: i32, #[case] points: i32, #[case] expected: i32) {
        let mut s = Score::new(start);
        s.decrement(points);
        assert_eq!(s.get(), expected);
    }

    #[test]
    fn set_clamps_negative() {
        let mut s = Score::default();
        s.set(-5);
        assert_eq!(s.get(), 0);
        s.set(i32::MAX);
        assert_eq!(s.get(), Score::MAX);
    }

    #[test]
    fn spending_is_all_or_nothing() {
        let mut s = Score::new(45);
        assert!(!s.try_spend(50));
        assert_eq!(s.get(), 45);
        assert!(s.try_spend(45));
        assert_eq!(s.get(), 0);
        assert!(!s.try_spend(-1));
    }
}
