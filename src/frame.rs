use std::time::Instant;

/// How often the FPS readout refreshes, in seconds
pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame metadata - frame number and wall-clock timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

/// Endless source of [`FrameInfo`], one per call to `next`
#[derive(Debug)]
pub struct FrameTimer {
    next_number: u64,
    start: Instant,
    last: Instant,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            next_number: 0,
            start: now,
            last: now,
        }
    }

    pub fn frames_started(&self) -> u64 {
        self.next_number
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameTimer {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let now = Instant::now();
        let info = FrameInfo {
            number: self.next_number,
            time: now.duration_since(self.start).as_secs_f32(),
            delta: now.duration_since(self.last).as_secs_f32(),
        };
        self.next_number += 1;
        self.last = now;
        Some(info)
    }
}

/// Frames per second averaged over [`FPS_UPDATE_INTERVAL`]
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame of `delta` seconds. Returns the new rate whenever the
    /// readout refreshes.
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;
        if self.elapsed < FPS_UPDATE_INTERVAL {
            return None;
        }
        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_numbers_increase() {
        let mut timer = FrameTimer::new();
        let numbers: Vec<u64> = timer.by_ref().take(3).map(|f| f.number).collect();
        assert_eq!(numbers, [0, 1, 2]);
        assert_eq!(timer.frames_started(), 3);
    }

    #[test]
    fn test_fps_refreshes_once_per_interval() {
        let mut counter = FpsCounter::new();
        for _ in 0..59 {
            assert_eq!(counter.record(1.0 / 60.0), None);
        }
        let fps = counter.record(1.0 / 60.0 + 0.001).unwrap();
        assert!((fps - 60.0).abs() < 0.1);
        assert_eq!(counter.fps(), fps);
    }
}
