use serde::{Deserialize, Serialize};

use crate::EngineConfig;

/// Gravity timing: the fall timer, the current fall interval and the
/// score-driven speed-ups applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallClock {
    timer_ms: u64,
    normal_interval_ms: u64,
    fast_fall: bool,
    speed_ups_applied: u64,
    speed_up_signal_ms: u64,
}

impl FallClock {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timer_ms: 0,
            normal_interval_ms: config.normal_fall_interval_ms,
            fast_fall: false,
            speed_ups_applied: 0,
            speed_up_signal_ms: 0,
        }
    }

    /// Time accumulated since the last gravity step.
    #[must_use]
    pub fn timer_ms(&self) -> u64 {
        self.timer_ms
    }

    #[must_use]
    pub fn normal_interval_ms(&self) -> u64 {
        self.normal_interval_ms
    }

    #[must_use]
    pub fn is_fast_fall(&self) -> bool {
        self.fast_fall
    }

    #[must_use]
    pub fn speed_ups_applied(&self) -> u64 {
        self.speed_ups_applied
    }

    /// Remaining time of the speed-up signal.
    #[must_use]
    pub fn speed_up_signal_ms(&self) -> u64 {
        self.speed_up_signal_ms
    }

    pub fn set_fast_fall(&mut self, enabled: bool) {
        self.fast_fall = enabled;
    }

    /// Interval gravity currently runs at. Fast fall is never slower than
    /// the normal interval.
    #[must_use]
    pub fn effective_interval_ms(&self, config: &EngineConfig) -> u64 {
        if self.fast_fall {
            config.fast_fall_interval_ms.min(self.normal_interval_ms)
        } else {
            self.normal_interval_ms
        }
    }

    /// Adds `elapsed_ms` to the timer. Returns `true` and resets the timer
    /// when a gravity step is due.
    ///
    /// At most one step is reported per call, however large `elapsed_ms` is.
    pub fn advance(&mut self, elapsed_ms: u64, config: &EngineConfig) -> bool {
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
        if self.timer_ms >= self.effective_interval_ms(config) {
            self.timer_ms = 0;
            return true;
        }
        false
    }

    /// Consumes `elapsed_ms` of the speed-up signal.
    pub fn decay_signal(&mut self, elapsed_ms: u64) {
        self.speed_up_signal_ms = self.speed_up_signal_ms.saturating_sub(elapsed_ms);
    }

    /// Applies one speed-up per `speed_up_threshold` crossed by `score` that
    /// has not been applied yet.
    ///
    /// Each speed-up removes `speed_up_percent`% of the current normal
    /// interval, floored at `min_fall_interval_ms`. Returns the number of
    /// speed-ups applied by this call.
    pub fn apply_score(&mut self, score: u64, config: &EngineConfig) -> u64 {
        let reached = score / config.speed_up_threshold;
        let mut applied = 0;
        while self.speed_ups_applied < reached {
            let interval = self.normal_interval_ms;
            let percent = config.speed_up_percent;
            let reduction = interval / 100 * percent + interval % 100 * percent / 100;
            self.normal_interval_ms = self
                .normal_interval_ms
                .saturating_sub(reduction)
                .max(config.min_fall_interval_ms);
            self.speed_ups_applied += 1;
            applied += 1;
        }
        if applied > 0 {
            self.speed_up_signal_ms = config.speed_up_signal_ms;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_steps_and_resets() {
        let config = EngineConfig::default();
        let mut clock = FallClock::new(&config);
        assert!(!clock.advance(200, &config));
        assert!(!clock.advance(200, &config));
        assert_eq!(clock.timer_ms(), 400);
        assert!(clock.advance(200, &config));
        assert_eq!(clock.timer_ms(), 0);
        // A long pause still yields a single step.
        assert!(clock.advance(5_000, &config));
        assert_eq!(clock.timer_ms(), 0);
    }

    #[test]
    fn test_fast_fall_interval() {
        let config = EngineConfig::default();
        let mut clock = FallClock::new(&config);
        clock.set_fast_fall(true);
        assert_eq!(clock.effective_interval_ms(&config), 100);
        assert!(clock.advance(100, &config));
        clock.set_fast_fall(false);
        assert_eq!(clock.effective_interval_ms(&config), 500);
    }

    #[test]
    fn test_fast_fall_never_slower_than_normal() {
        let config = EngineConfig {
            normal_fall_interval_ms: 80,
            ..EngineConfig::default()
        };
        let mut clock = FallClock::new(&config);
        clock.set_fast_fall(true);
        assert_eq!(clock.effective_interval_ms(&config), 80);
    }

    #[test]
    fn test_speed_up_per_threshold() {
        let config = EngineConfig::default();
        let mut clock = FallClock::new(&config);

        assert_eq!(clock.apply_score(9_999, &config), 0);
        assert_eq!(clock.normal_interval_ms(), 500);
        assert_eq!(clock.speed_up_signal_ms(), 0);

        assert_eq!(clock.apply_score(10_000, &config), 1);
        assert_eq!(clock.normal_interval_ms(), 450);
        assert_eq!(clock.speed_up_signal_ms(), 3_000);

        // Same threshold is never applied twice.
        assert_eq!(clock.apply_score(10_500, &config), 0);
        assert_eq!(clock.normal_interval_ms(), 450);

        // A single large award crossing two thresholds applies both.
        assert_eq!(clock.apply_score(30_100, &config), 2);
        assert_eq!(clock.normal_interval_ms(), 365);
        assert_eq!(clock.speed_ups_applied(), 3);
    }

    #[test]
    fn test_speed_up_floor() {
        let config = EngineConfig::default();
        let mut clock = FallClock::new(&config);
        clock.apply_score(10_000_000, &config);
        assert_eq!(clock.normal_interval_ms(), 50);
        assert_eq!(clock.speed_ups_applied(), 1_000);
    }

    #[test]
    fn test_speed_up_with_huge_interval() {
        let config = EngineConfig {
            normal_fall_interval_ms: u64::MAX,
            speed_up_threshold: 1,
            ..EngineConfig::default()
        };
        let mut clock = FallClock::new(&config);
        assert_eq!(clock.apply_score(1, &config), 1);
        assert_eq!(
            clock.normal_interval_ms(),
            u64::MAX - (u64::MAX / 100 * 10 + u64::MAX % 100 * 10 / 100)
        );
    }

    #[test]
    fn test_signal_decay() {
        let config = EngineConfig::default();
        let mut clock = FallClock::new(&config);
        clock.apply_score(10_000, &config);
        clock.decay_signal(2_000);
        assert_eq!(clock.speed_up_signal_ms(), 1_000);
        clock.decay_signal(2_000);
        assert_eq!(clock.speed_up_signal_ms(), 0);
    }
}
