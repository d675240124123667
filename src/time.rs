use std::time::Duration;

/// Fixed-step world clock. World time is a monotonic millisecond count starting at zero.
pub struct FrameClock {
    frame: Duration,
    elapsed: Duration,
    frames: u64,
}

impl FrameClock {
    pub fn new(frame_ms: u64) -> Self {
        Self { frame: Duration::from_millis(frame_ms.max(1)), elapsed: Duration::ZERO, frames: 0 }
    }

    /// Advances one frame and returns the new world time.
    pub fn tick(&mut self) -> u64 {
        self.elapsed += self.frame;
        self.frames += 1;
        self.world_time()
    }

    pub fn world_time(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn frame_ms(&self) -> u64 {
        self.frame.as_millis() as u64
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
