use serde::{Deserialize, Serialize};

const SLIDER_SCALE: f64 = 127.0;
const MIN_WIDTH_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiRange {
    pub lower: f64,
    pub upper: f64,
}

impl VoiRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn from_center_width(center: f64, width: f64) -> Self {
        Self {
            lower: center - width / 2.0,
            upper: center + width / 2.0,
        }
    }

    pub fn center(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Window a viewport showed before any contrast or brightness was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevelBaseline {
    center: f64,
    width: f64,
}

impl WindowLevelBaseline {
    pub fn capture(range: VoiRange) -> Self {
        Self {
            center: range.center(),
            width: range.width(),
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Contrast narrows the window (never below a tenth of the baseline),
    /// brightness slides its center by a fraction of the baseline width.
    pub fn apply(&self, contrast: f64, brightness: f64) -> VoiRange {
        let factor = (1.0 - contrast / SLIDER_SCALE).max(MIN_WIDTH_FACTOR);
        let width = self.width * factor;
        let center = self.center - (brightness / SLIDER_SCALE) * self.width;
        VoiRange::from_center_width(center, width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityPoint {
    pub value: f64,
    pub opacity: f64,
}

impl OpacityPoint {
    pub fn new(value: f64, opacity: f64) -> Self {
        Self { value, opacity }
    }
}

pub fn shift_opacity(baseline: &[OpacityPoint], shift: f64) -> Vec<OpacityPoint> {
    baseline
        .iter()
        .map(|point| OpacityPoint::new(point.value + shift, point.opacity))
        .collect()
}
