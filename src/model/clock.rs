use std::time::Instant;

/// Frame timing: seconds since the previous frame and a running frame count.
///
/// The frame count, not wall-clock time, drives the orbits, so orbital
/// speed depends on frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    pub delta: f32,
    pub frame: u32,
}

impl FrameClock {
    pub fn new(start: Instant) -> Self {
        Self { last: start, delta: 0.0, frame: 0 }
    }

    /// Start a new frame at `now`
    pub fn tick(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frame = self.frame.wrapping_add(1);
    }
}
