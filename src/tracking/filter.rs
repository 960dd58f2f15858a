//! Exponential smoothing of target offsets.

/// `alpha * raw + (1 - alpha) * previous`.
pub fn smooth(raw: f64, previous: f64, alpha: f64) -> f64 { alpha * raw + (1.0 - alpha) * previous }

/// Per-axis exponential filter for the target's offset from frame center.
///
/// The filter only moves when a sample arrives. On ticks without one the
/// last value is kept as is rather than decaying toward zero, so a target
/// that drops out for a few frames is picked up again where it was.
///
/// The first sample after construction or [`reset`](OffsetFilter::reset)
/// seeds the filter directly.
#[derive(Clone, Debug)]
pub struct OffsetFilter {
    alpha: f64,
    value: Option<(f64, f64)>,
}

impl OffsetFilter {
    /// `alpha` is clamped into `(0, 1]`; a non-finite value disables
    /// smoothing.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha.clamp(f64::EPSILON, 1.0) } else { 1.0 };
        Self { alpha, value: None }
    }

    /// Feeds one raw offset pair and returns the smoothed pair.
    ///
    /// Non-finite input is ignored and the held value is returned.
    pub fn update(&mut self, raw_x: f64, raw_y: f64) -> (f64, f64) {
        if !(raw_x.is_finite() && raw_y.is_finite()) {
            return self.value();
        }
        let next = match self.value {
            Some((px, py)) => (smooth(raw_x, px, self.alpha), smooth(raw_y, py, self.alpha)),
            None => (raw_x, raw_y),
        };
        self.value = Some(next);
        next
    }

    /// Current smoothed offsets, `(0, 0)` before the first sample.
    pub fn value(&self) -> (f64, f64) { self.value.unwrap_or((0.0, 0.0)) }

    pub fn is_seeded(&self) -> bool { self.value.is_some() }

    pub fn reset(&mut self) { self.value = None; }
}
