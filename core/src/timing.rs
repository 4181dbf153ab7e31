//! Frame pacing against a fixed target period

use std::time::{Duration, Instant};

/// Fraction of the remaining frame time handed to the coarse sleep.
///
/// Sleep granularity cannot hit the target exactly, so the sleep undershoots
/// and a spin on the clock covers the rest.
const SLEEP_MARGIN: f64 = 0.98;

/// Holds the loop at a fixed iteration duration.
///
/// Each call to [`pace`](Self::pace) blocks until one full target period has
/// elapsed since the previous reference timestamp, then moves the reference
/// to now. An iteration that already overran the target is never delayed
/// further; it is counted and the loop proceeds.
#[derive(Debug)]
pub struct FrameGovernor {
    target: Duration,
    mark: Instant,
    missed_deadlines: u64,
    last_frame: Duration,
}

impl FrameGovernor {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            mark: Instant::now(),
            missed_deadlines: 0,
            last_frame: Duration::ZERO,
        }
    }

    /// Governor for a fixed update rate in Hz.
    pub fn for_update_hz(update_hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(update_hz.max(1))))
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Block until the target period has elapsed, then start the next one.
    ///
    /// Returns the measured duration of the finished iteration.
    pub fn pace(&mut self) -> Duration {
        let elapsed = self.mark.elapsed();
        if elapsed < self.target {
            let coarse = (self.target - elapsed).mul_f64(SLEEP_MARGIN);
            if !coarse.is_zero() {
                std::thread::sleep(coarse);
            }
            while self.mark.elapsed() < self.target {
                std::hint::spin_loop();
            }
        } else {
            self.missed_deadlines += 1;
            tracing::debug!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                target_ms = self.target.as_secs_f64() * 1000.0,
                "missed frame deadline"
            );
        }

        self.last_frame = self.mark.elapsed();
        self.mark = Instant::now();
        self.last_frame
    }

    /// Restart the reference timestamp, discarding elapsed time.
    ///
    /// Used after long stalls that should not count as missed frames
    /// (startup, window reconfiguration).
    pub fn rearm(&mut self) {
        self.mark = Instant::now();
    }

    /// Iterations that overran the target so far.
    pub fn missed_deadlines(&self) -> u64 {
        self.missed_deadlines
    }

    /// Measured duration of the most recent iteration.
    pub fn last_frame_time(&self) -> Duration {
        self.last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_target_period_for_idle_iterations() {
        let target = Duration::from_millis(5);
        let epsilon = Duration::from_millis(2);
        let mut governor = FrameGovernor::new(target);

        governor.rearm();
        for _ in 0..100 {
            let frame = governor.pace();
            assert!(frame >= target, "frame ended early: {frame:?}");
            assert!(
                frame <= target + epsilon,
                "frame overran target by more than {epsilon:?}: {frame:?}"
            );
        }
        assert_eq!(governor.missed_deadlines(), 0);
    }

    #[test]
    fn overrunning_iteration_is_counted_not_delayed() {
        let target = Duration::from_millis(1);
        let mut governor = FrameGovernor::new(target);

        governor.rearm();
        std::thread::sleep(Duration::from_millis(5));
        let before = Instant::now();
        let frame = governor.pace();
        let pace_cost = before.elapsed();

        assert_eq!(governor.missed_deadlines(), 1);
        assert!(frame >= Duration::from_millis(5));
        // No sleep happened: pace returned almost immediately.
        assert!(pace_cost < Duration::from_millis(2));
    }

    #[test]
    fn reference_timestamp_advances_every_iteration() {
        let mut governor = FrameGovernor::for_update_hz(1000);
        let first = governor.pace();
        let second = governor.pace();
        // Each frame is measured from its own reference, not accumulated.
        assert!(second < first + governor.target() + Duration::from_millis(5));
    }
}
