/// Per-frame timing source.
///
/// `tick` is fed the current time in seconds (the caller owns the actual
/// wall-clock source) and hands back the delta since the previous tick. The
/// first tick has no prior sample and reports a zero-length step.
#[derive(Debug, Default)]
pub struct FrameClock {
    previous: Option<f64>,
    window_start: Option<f64>,
    frames_in_window: u32,
    fps_sample: Option<u32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock and returns the elapsed seconds since the last
    /// tick. Also maintains the one-second frame counter behind
    /// [`FrameClock::take_fps_sample`].
    pub fn tick(&mut self, now: f64) -> f32 {
        let delta = match self.previous {
            Some(previous) => (now - previous) as f32,
            None => 0.0,
        };
        self.previous = Some(now);

        self.frames_in_window += 1;
        let window_start = *self.window_start.get_or_insert(now);
        if now - window_start >= 1.0 {
            self.fps_sample = Some(self.frames_in_window);
            self.frames_in_window = 0;
            self.window_start = Some(window_start + 1.0);
        }

        delta
    }

    /// Frames counted over the most recently completed second, if a full
    /// second has elapsed since the last sample was taken. Display metric
    /// only; nothing else reads it.
    pub fn take_fps_sample(&mut self) -> Option<u32> {
        self.fps_sample.take()
    }
}
