//! Frame clock feeding the per-frame `_Time` uniform

use std::time::{Duration, Instant};

/// Tracks elapsed time since the clock started (the "time since level load"
/// the blade kernel animates wind with) and per-frame deltas.
pub struct GrassClock {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
}

impl GrassClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Seconds elapsed between clock start and the last tick
    pub fn elapsed_secs(&self) -> f32 {
        (self.last_frame - self.start).as_secs_f32()
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Restart elapsed time from zero (a new "level load")
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GrassClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances() {
        let mut clock = GrassClock::new();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.elapsed_secs(), 0.0);

        std::thread::sleep(Duration::from_millis(5));
        clock.tick();
        assert_eq!(clock.frame_count(), 1);
        assert!(clock.elapsed_secs() > 0.0);
        assert!(clock.delta_secs() > 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = GrassClock::new();
        clock.tick();
        clock.tick();
        clock.reset();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.elapsed_secs(), 0.0);
    }
}
