//! Time-based on/off gate for weather.

/// Alternates between an active phase of `on_seconds` and a clear phase of
/// `off_seconds`, starting active.
#[derive(Clone, Debug)]
pub struct WeatherSchedule {
    /// Length of the active phase in seconds.
    pub on_seconds: f32,
    /// Length of the clear phase in seconds.
    pub off_seconds: f32,
    /// Whether the clock is frozen.
    pub paused: bool,
    active: bool,
    phase_elapsed: f32,
}

impl WeatherSchedule {
    pub fn new(on_seconds: f32, off_seconds: f32) -> Self {
        Self {
            on_seconds,
            off_seconds,
            paused: false,
            active: true,
            phase_elapsed: 0.0,
        }
    }

    /// Advances the clock by `dt` seconds and returns whether weather is active.
    ///
    /// A non-positive `on_seconds` keeps weather off forever; otherwise a
    /// non-positive `off_seconds` keeps it on forever.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !(self.on_seconds > 0.0) {
            self.active = false;
            return false;
        }
        if !(self.off_seconds > 0.0) {
            self.active = true;
            return true;
        }
        if self.paused || !(dt.is_finite() && dt > 0.0) {
            return self.active;
        }

        self.phase_elapsed += dt;
        loop {
            let span = if self.active { self.on_seconds } else { self.off_seconds };
            if self.phase_elapsed < span {
                break;
            }
            self.phase_elapsed -= span;
            self.active = !self.active;
            tracing::debug!(active = self.active, "weather schedule flipped");
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds spent in the current phase.
    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }
}

impl Default for WeatherSchedule {
    fn default() -> Self {
        Self::new(60.0, 90.0)
    }
}
