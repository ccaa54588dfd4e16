use std::time::Instant;

/// Step substituted for a frame delta that is unusable.
pub const NOMINAL_DELTA: f32 = 0.016;
/// Longest frame delta (seconds) accepted as-is.
pub const MAX_DELTA: f32 = 0.1;

/// Replaces non-positive, non-finite or oversized deltas with
/// [`NOMINAL_DELTA`].
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 && dt <= MAX_DELTA {
        dt
    } else {
        log::warn!("frame delta {dt} s out of range, using {NOMINAL_DELTA} s");
        NOMINAL_DELTA
    }
}

/// Measures wall time between frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous tick, clamped. The first tick yields the
    /// nominal step.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last.replace(now) {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => NOMINAL_DELTA,
        };
        clamp_delta(dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, NOMINAL_DELTA)]
    #[case(-0.5, NOMINAL_DELTA)]
    #[case(0.25, NOMINAL_DELTA)]
    #[case(f32::NAN, NOMINAL_DELTA)]
    #[case(f32::INFINITY, NOMINAL_DELTA)]
    #[case(0.033, 0.033)]
    #[case(0.1, 0.1)]
    fn clamps_unusable_deltas(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(clamp_delta(input), expected);
    }

    #[test]
    fn first_tick_is_nominal() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), NOMINAL_DELTA);
        let dt = clock.tick();
        assert!(dt > 0.0 && dt <= MAX_DELTA);
    }
}
