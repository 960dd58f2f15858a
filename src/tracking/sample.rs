//! Target measurements and frame geometry.

use serde::{Deserialize, Serialize};

/// One detection handed over by the vision producer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetSample {
    /// Centroid x in pixels, `0` at the left edge.
    pub x:          f64,
    /// Centroid y in pixels, `0` at the top edge.
    pub y:          f64,
    /// Apparent area divided by frame area. Positive when visible.
    pub size_ratio: f64,
}

impl TargetSample {
    pub fn new(x: f64, y: f64, size_ratio: f64) -> Self { Self { x, y, size_ratio } }

    /// Returns the sample if it is usable, `None` if it must be treated as a
    /// missed detection.
    ///
    /// Rejects non-finite values, a non-positive size and, when the frame
    /// size is known, centroids outside the frame.
    pub fn validated(self, frame: FrameGeometry) -> Option<Self> {
        if !(self.x.is_finite() && self.y.is_finite() && self.size_ratio.is_finite()) {
            return None;
        }
        if self.size_ratio <= 0.0 {
            return None;
        }
        if frame.is_known() && !frame.contains(self.x, self.y) {
            return None;
        }
        Some(self)
    }

    /// Offset of the centroid from the frame center, `(x, y)` in pixels.
    ///
    /// Without a known frame size there is no center to measure from, and the
    /// target reads as centered.
    pub fn offsets(&self, frame: FrameGeometry) -> (f64, f64) {
        if !frame.is_known() {
            return (0.0, 0.0);
        }
        let (cx, cy) = frame.center();
        (self.x - cx, self.y - cy)
    }
}

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width:  u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self { Self { width, height } }

    /// Both dimensions are non-zero.
    pub fn is_known(&self) -> bool { self.width > 0 && self.height > 0 }

    pub fn center(&self) -> (f64, f64) { (self.width as f64 / 2.0, self.height as f64 / 2.0) }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width as f64).contains(&x) && (0.0..=self.height as f64).contains(&y)
    }
}

/// Size ratio normalised to the ratio seen at the desired standoff.
///
/// `1.0` means "at the standoff distance". A missing calibration (zero
/// reference ratio or unknown frame size) yields `0.0`, i.e. "far away", so
/// a calibration gap can never look like arrival.
pub fn ratio_proportion(size_ratio: f64, reference_ratio: f64, frame: FrameGeometry) -> f64 {
    if !frame.is_known() || !reference_ratio.is_finite() || reference_ratio <= 0.0 {
        return 0.0;
    }
    if !size_ratio.is_finite() || size_ratio <= 0.0 {
        return 0.0;
    }
    size_ratio / reference_ratio
}
