use std::time::Duration;

const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Counts frames per elapsed second of simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRateMeter {
    elapsed: Duration,
    frames: u32,
    last_sample: Option<u32>,
}

impl FrameRateMeter {
    /// Records one frame. Returns the new frame rate when a full second has elapsed.
    pub fn record(&mut self, dt: Duration) -> Option<u32> {
        self.frames = self.frames.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < SAMPLE_WINDOW {
            return None;
        }
        let fps = self.frames;
        self.frames = 0;
        self.elapsed = Duration::ZERO;
        self.last_sample = Some(fps);
        Some(fps)
    }

    /// Most recently completed frame-rate sample.
    #[must_use]
    pub const fn last_sample(&self) -> Option<u32> {
        self.last_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_frames_counted_within_one_second() {
        let mut meter = FrameRateMeter::default();
        let frame = Duration::from_millis(25);
        let samples: Vec<_> = (0..40).filter_map(|_| meter.record(frame)).collect();
        assert_eq!(samples, vec![40]);
        assert_eq!(meter.last_sample(), Some(40));
    }
}
