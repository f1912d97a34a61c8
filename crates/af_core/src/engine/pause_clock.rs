//! Logical battle time: wall-clock elapsed since start, minus every interval
//! spent paused waiting for resources.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PauseClock {
    started_at: Instant,
    paused_at: Option<Instant>,
    accumulated_pause: Duration,
}

impl PauseClock {
    /// A running clock whose zero is `now`.
    pub fn start(now: Instant) -> Self {
        Self { started_at: now, paused_at: None, accumulated_pause: Duration::ZERO }
    }

    /// Freeze logical time. No-op if already paused.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
            log::debug!("timeline paused at {:.2}s", self.elapsed_seconds(now));
        }
    }

    /// Resume logical time, discarding the paused interval. No-op if running.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.accumulated_pause += now.saturating_duration_since(paused_at);
            log::debug!("timeline resumed at {:.2}s", self.elapsed_seconds(now));
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Logical elapsed time. Frozen while paused; never negative; monotone
    /// non-decreasing for monotone `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(self.started_at)
            .saturating_sub(self.accumulated_pause)
    }

    pub fn elapsed_seconds(&self, now: Instant) -> f64 {
        self.elapsed(now).as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_elapsed_while_running() {
        let base = Instant::now();
        let clock = PauseClock::start(base);
        assert_eq!(clock.elapsed_seconds(base), 0.0);
        assert_eq!(clock.elapsed(at(base, 2_500)), Duration::from_millis(2_500));
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let base = Instant::now();
        let mut clock = PauseClock::start(base);
        clock.pause(at(base, 1_000));

        assert!(clock.is_paused());
        assert_eq!(clock.elapsed(at(base, 5_000)), Duration::from_secs(1));
        assert_eq!(clock.elapsed(at(base, 60_000)), Duration::from_secs(1));
    }

    #[test]
    fn test_resume_excludes_paused_interval() {
        let base = Instant::now();
        let mut clock = PauseClock::start(base);

        let before_pause = clock.elapsed(at(base, 1_000));
        clock.pause(at(base, 1_000));
        clock.resume(at(base, 4_000));

        // 3s of wall clock passed while paused; logical time ignores it
        let after = clock.elapsed(at(base, 6_000));
        assert_eq!(after, Duration::from_secs(3));
        assert_eq!(
            after - before_pause,
            Duration::from_secs(5) - Duration::from_secs(3)
        );
    }

    #[test]
    fn test_double_pause_and_resume_are_noops() {
        let base = Instant::now();
        let mut clock = PauseClock::start(base);

        clock.resume(at(base, 500));
        assert!(!clock.is_paused());

        clock.pause(at(base, 1_000));
        clock.pause(at(base, 2_000));
        clock.resume(at(base, 3_000));

        // Second pause must not have moved the pause start
        assert_eq!(clock.elapsed(at(base, 3_000)), Duration::from_secs(1));
    }

    #[test]
    fn test_repeated_pause_cycles_accumulate() {
        let base = Instant::now();
        let mut clock = PauseClock::start(base);

        clock.pause(at(base, 1_000));
        clock.resume(at(base, 2_000));
        clock.pause(at(base, 3_000));
        clock.resume(at(base, 5_000));

        // 6s wall clock, 3s paused
        assert_eq!(clock.elapsed(at(base, 6_000)), Duration::from_secs(3));
    }

    #[test]
    fn test_elapsed_monotone_over_ticks() {
        let base = Instant::now();
        let mut clock = PauseClock::start(base);
        let mut previous = Duration::ZERO;

        for ms in [0, 400, 800, 1_200, 1_600, 2_000] {
            if ms == 800 {
                clock.pause(at(base, ms));
            }
            if ms == 1_600 {
                clock.resume(at(base, ms));
            }
            let elapsed = clock.elapsed(at(base, ms));
            assert!(elapsed >= previous);
            previous = elapsed;
        }
    }
}
