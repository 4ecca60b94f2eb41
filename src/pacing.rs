use std::thread;
use std::time::{Duration, Instant};

/// Caps the display loop at a fixed number of frames per second.
#[derive(Debug)]
pub struct FramePacer {
    frame_duration: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    /// A `frame_rate` of zero disables pacing.
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        let frame_duration =
            (frame_rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(frame_rate)));
        FramePacer {
            frame_duration,
            last_frame: None,
        }
    }

    #[must_use]
    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame_duration
    }

    /// Sleeps until one frame duration has passed since the previous call, and returns how
    /// long it slept.
    pub fn wait(&mut self) -> Duration {
        let Some(frame_duration) = self.frame_duration else {
            return Duration::ZERO;
        };
        let slept = match self.last_frame {
            Some(last_frame) => {
                let remaining = frame_duration.saturating_sub(last_frame.elapsed());
                if !remaining.is_zero() {
                    thread::sleep(remaining);
                }
                remaining
            }
            None => Duration::ZERO,
        };
        self.last_frame = Some(Instant::now());
        slept
    }
}
