use std::time::Instant;

/// Wall-clock time since startup plus the per-frame delta
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    /// Seconds since the clock started; drives animation
    pub time: f32,
    /// Seconds since the previous tick; drives movement
    pub delta: f32,
}

#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame_time: f32,
}

impl FrameClock {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            last_frame_time: 0.0,
        }
    }

    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let time = now.saturating_duration_since(self.start).as_secs_f32();
        let delta = (time - self.last_frame_time).max(0.0);
        self.last_frame_time = time;
        FrameTime { time, delta }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_reports_time_and_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);

        let first = clock.tick(start + Duration::from_millis(500));
        assert!((first.time - 0.5).abs() < 1e-6);
        assert!((first.delta - 0.5).abs() < 1e-6);

        let second = clock.tick(start + Duration::from_millis(750));
        assert!((second.time - 0.75).abs() < 1e-6);
        assert!((second.delta - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start + Duration::from_secs(1));
        let frame = clock.tick(start);
        assert_eq!(frame.time, 0.0);
        assert_eq!(frame.delta, 0.0);
    }
}
