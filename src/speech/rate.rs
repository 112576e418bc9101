//! Speaking-rate limits.
//!
//! Rates are plain `f32` values in the engine's native scale.  Out-of-range
//! input is never rejected; [`RateBounds::clamp`] pulls it into range.

/// Inclusive `[min, max]` range plus the rate used when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    min: f32,
    max: f32,
    default: f32,
}

impl RateBounds {
    pub const MIN_RATE: f32 = 0.0;
    pub const MAX_RATE: f32 = 1.0;
    pub const DEFAULT_RATE: f32 = 0.5;

    /// Build bounds from possibly sloppy config values.
    ///
    /// Swapped limits are reordered, non-finite limits fall back to the
    /// engine constants and `default` is clamped into the range.
    pub fn new(min: f32, max: f32, default: f32) -> Self {
        let min = if min.is_finite() { min } else { Self::MIN_RATE };
        let max = if max.is_finite() { max } else { Self::MAX_RATE };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };

        let default = if default.is_finite() {
            default.clamp(min, max)
        } else {
            Self::DEFAULT_RATE.clamp(min, max)
        };

        Self { min, max, default }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn default_rate(&self) -> f32 {
        self.default
    }

    pub fn contains(&self, rate: f32) -> bool {
        rate >= self.min && rate <= self.max
    }

    /// Pull `rate` into range.  `NaN` maps to the default rate.
    ///
    /// ```
    /// use listen_later::speech::RateBounds;
    ///
    /// let bounds = RateBounds::default();
    /// assert_eq!(bounds.clamp(3.0), 1.0);
    /// assert_eq!(bounds.clamp(-1.0), 0.0);
    /// assert_eq!(bounds.clamp(f32::NAN), 0.5);
    /// ```
    pub fn clamp(&self, rate: f32) -> f32 {
        if rate.is_nan() {
            self.default
        } else {
            rate.clamp(self.min, self.max)
        }
    }

    /// Discrete rates advertised to remote transports.
    ///
    /// Steps by `increment` from `min` up to the default, then from the
    /// default up to `max`, and always ends with `max`.  A non-positive
    /// increment advertises only the three anchor rates.
    pub fn supported_rates(&self, increment: f32) -> Vec<f32> {
        let mut rates = Vec::new();

        if increment.is_finite() && increment > 0.0 {
            Self::push_steps(&mut rates, self.min, self.default, increment);
            Self::push_steps(&mut rates, self.default, self.max, increment);
        } else {
            rates.push(self.min);
            if self.default > self.min && self.default < self.max {
                rates.push(self.default);
            }
        }

        if rates.last() != Some(&self.max) {
            rates.push(self.max);
        }
        rates
    }

    /// Push `from, from + step, …` while strictly below `until`.
    fn push_steps(rates: &mut Vec<f32>, from: f32, until: f32, step: f32) {
        let mut i = 0u32;
        loop {
            let rate = from + step * i as f32;
            if rate >= until {
                break;
            }
            rates.push(rate);
            i += 1;
        }
    }
}

impl Default for RateBounds {
    fn default() -> Self {
        Self::new(Self::MIN_RATE, Self::MAX_RATE, Self::DEFAULT_RATE)
    }
}
