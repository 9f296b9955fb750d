use std::thread;
use std::time::Duration;
use web_time::Instant;

/// Paces the render loop to an optional frame-rate cap.
///
/// Presentation is already paced by vsync; the cap only matters when it is lower than
/// the display refresh rate, or when vsync is off.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    min_dur_per_frame: Option<Duration>,
    last_frame: Instant,
}

impl FrameScheduler {
    /// Creates a scheduler allowing at most `max_fps` frames per second, or no limit.
    pub fn new(max_fps: Option<f64>) -> Self {
        Self {
            min_dur_per_frame: max_fps
                .filter(|fps| *fps > 0.0)
                .map(|fps| Duration::from_secs_f64(1.0 / fps)),
            last_frame: Instant::now(),
        }
    }

    /// The shortest time between two frames, if capped.
    #[inline]
    pub fn min_frame_duration(&self) -> Option<Duration> {
        self.min_dur_per_frame
    }

    /// How long to wait before starting the next frame, `now` being the current time.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.min_dur_per_frame {
            Some(min) => min.saturating_sub(now.duration_since(self.last_frame)),
            None => Duration::ZERO,
        }
    }

    /// Sleeps until the next frame may start, then marks its beginning.
    pub fn wait(&mut self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        self.last_frame = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_never_waits() {
        let scheduler = FrameScheduler::new(None);
        assert_eq!(scheduler.remaining(Instant::now()), Duration::ZERO);
        assert_eq!(FrameScheduler::new(Some(0.0)).min_frame_duration(), None);
    }

    #[test]
    fn cap_spaces_frames() {
        let mut scheduler = FrameScheduler::new(Some(50.0));
        assert_eq!(scheduler.min_frame_duration(), Some(Duration::from_millis(20)));

        scheduler.wait();
        let start = Instant::now();
        scheduler.wait();
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert!(scheduler.remaining(Instant::now()) <= Duration::from_millis(20));
    }
}
