//! Stroke interpolation - resamples a pointer path into evenly spaced dabs

use super::BrushSettings;
use crate::core::brush_model::{validate_position, validate_pressure};
use crate::core::errors::CoreError;
use serde::{Deserialize, Serialize};

/// One pointer sample of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSample {
    /// X coordinate in canvas space
    pub x: f32,
    /// Y coordinate in canvas space
    pub y: f32,
    /// Normalized pressure (0.0 - 1.0)
    pub pressure: f32,
}

impl StrokeSample {
    /// Sample from a device without pressure reporting (pressure 1.0)
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: 1.0,
        }
    }

    /// Sample with a reported pressure; out-of-range pressure is rejected
    pub fn with_pressure(x: f32, y: f32, pressure: f32) -> Result<Self, CoreError> {
        let sample = Self { x, y, pressure };
        sample.validate()?;
        Ok(sample)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_position(self.x, self.y)?;
        validate_pressure(self.pressure)
    }

    fn distance_to(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A resolved dab position along the path, with its interpolated pressure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DabPoint {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

impl DabPoint {
    fn lerp(p0: &StrokeSample, p1: &StrokeSample, t: f32) -> Self {
        Self {
            x: p0.x + (p1.x - p0.x) * t,
            y: p0.y + (p1.y - p0.y) * t,
            // Rounding can overshoot the endpoints by an ulp
            pressure: (p0.pressure + (p1.pressure - p0.pressure) * t).clamp(0.0, 1.0),
        }
    }
}

impl From<StrokeSample> for DabPoint {
    fn from(sample: StrokeSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            pressure: sample.pressure,
        }
    }
}

/// Upper bound on dabs laid along one segment
pub const MAX_SEGMENT_INTERVALS: usize = 1 << 20;

/// Dab positions along the straight segment `p0 -> p1`.
///
/// Consecutive dabs are at most `nominal_size × spacing` pixels apart, both
/// endpoints are included, and a zero-length segment yields only `p0`.
/// Segments needing more than [`MAX_SEGMENT_INTERVALS`] steps are spread
/// over that many instead.
pub fn interpolate_segment(
    p0: &StrokeSample,
    p1: &StrokeSample,
    nominal_size: u32,
    spacing: f32,
) -> Vec<DabPoint> {
    let step = nominal_size as f32 * spacing;
    let dist = p0.distance_to(p1);

    if dist <= f32::EPSILON || step <= 0.0 || !dist.is_finite() {
        return vec![DabPoint::from(*p0)];
    }

    let intervals = ((dist / step).ceil().min(MAX_SEGMENT_INTERVALS as f32) as usize).max(1);
    let mut result = Vec::with_capacity(intervals + 1);

    for i in 0..=intervals {
        let t = i as f32 / intervals as f32;
        result.push(DabPoint::lerp(p0, p1, t));
    }

    result
}

/// Dab positions for a whole stroke, in path order.
///
/// Segments are joined without repeating the shared sample, so a stroke of
/// one sample is a single dab and an empty stroke yields nothing.
pub fn interpolate_stroke(samples: &[StrokeSample], settings: &BrushSettings) -> Vec<DabPoint> {
    match samples {
        [] => Vec::new(),
        [only] => vec![DabPoint::from(*only)],
        _ => {
            let mut result = Vec::with_capacity(samples.len() * 4);
            for (i, pair) in samples.windows(2).enumerate() {
                let segment = interpolate_segment(&pair[0], &pair[1], settings.size, settings.spacing);
                let skip = usize::from(i > 0);
                result.extend(segment.into_iter().skip(skip));
            }
            result
        }
    }
}

/// Calculate the length of a path through samples
pub fn path_length(samples: &[StrokeSample]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }

    samples.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}
