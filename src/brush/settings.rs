//! Brush settings - the per-stroke brush configuration

use super::{BlendMode, BrushType};
use crate::core::brush_model::validate_brush_settings;
use crate::core::errors::CoreError;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Externally loaded stamp texture.
///
/// The caller keeps ownership; the engine only reads it and resamples it to
/// the effective dab size at mask synthesis time.
#[derive(Debug, Clone)]
pub struct StampTexture(Arc<GrayImage>);

impl StampTexture {
    pub fn new(image: Arc<GrayImage>) -> Self {
        Self(image)
    }

    /// Convert any decoded image to a coverage texture (luma channel)
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self(Arc::new(image.to_luma8()))
    }

    pub fn image(&self) -> &GrayImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// True when both handles point at the same texture allocation
    pub fn ptr_eq(&self, other: &StampTexture) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Brush settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrushSettings {
    /// Brush family
    #[serde(rename = "type")]
    pub brush_type: BrushType,
    /// Nominal brush diameter in pixels
    pub size: u32,
    /// Base opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Hardness (0.0 - 1.0), affects edge falloff
    pub hardness: f32,
    /// Spacing between dabs (as fraction of the nominal diameter)
    pub spacing: f32,
    /// Rotation in degrees (flat tip, and round tips with roundness < 1)
    pub angle: f32,
    /// Minor/major axis ratio of round tips (1.0 = circle)
    pub roundness: f32,
    /// Pressure affects opacity
    pub pressure_affects_opacity: bool,
    /// Pressure affects size
    pub pressure_affects_size: bool,
    /// Compositing operator
    pub blend_mode: BlendMode,
    /// Calligraphy nib angle in degrees
    pub calligraphy_angle: f32,
    /// Calligraphy nib width as a fraction of its length
    pub calligraphy_width: f32,
    /// Number of particles per spray dab
    pub spray_density: u32,
    /// Spray scatter (0.0 - 1.0): shrinks the spray disc and grows particles
    pub spray_jitter: f32,
    /// Stamp texture; without one a Stamp brush paints a Round mask
    #[serde(skip)]
    pub stamp_texture: Option<StampTexture>,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            brush_type: BrushType::Round,
            size: 10,
            opacity: 1.0,
            hardness: 0.5,
            spacing: 0.25,
            angle: 0.0,
            roundness: 1.0,
            pressure_affects_opacity: true,
            pressure_affects_size: true,
            blend_mode: BlendMode::Normal,
            calligraphy_angle: 45.0,
            calligraphy_width: 0.3,
            spray_density: 50,
            spray_jitter: 0.5,
            stamp_texture: None,
        }
    }
}

impl BrushSettings {
    /// Default settings for a given brush family
    pub fn new(brush_type: BrushType, size: u32) -> Self {
        Self {
            brush_type,
            size,
            ..Default::default()
        }
    }

    /// Parse a JSON preset and validate it
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: BrushSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject out-of-range values; nothing is clamped
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_brush_settings(self)
    }

    pub fn with_texture(mut self, texture: StampTexture) -> Self {
        self.stamp_texture = Some(texture);
        self
    }

    /// Distance between consecutive dabs in pixels, from the nominal size
    pub fn spacing_px(&self) -> f32 {
        self.size as f32 * self.spacing
    }
}

/// Fold an angle in degrees into [0, 360)
#[inline]
pub(crate) fn normalize_degrees(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = BrushSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.spacing_px(), 2.5);
    }

    #[test]
    fn parses_preset_with_partial_fields() {
        let settings =
            BrushSettings::from_json(r#"{"type":"calligraphy","size":24,"blendMode":"multiply"}"#)
                .unwrap();
        assert_eq!(settings.brush_type, BrushType::Calligraphy);
        assert_eq!(settings.size, 24);
        assert_eq!(settings.blend_mode, BlendMode::Multiply);
        assert_eq!(settings.calligraphy_angle, 45.0);
    }

    #[test]
    fn unknown_brush_type_is_rejected() {
        let err = BrushSettings::from_json(r#"{"type":"charcoal"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));
    }

    #[test]
    fn invalid_preset_values_are_rejected() {
        let err = BrushSettings::from_json(r#"{"size":0}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn preset_round_trip_drops_texture() {
        let texture = StampTexture::new(Arc::new(GrayImage::new(4, 4)));
        let settings = BrushSettings::new(BrushType::Stamp, 16).with_texture(texture);
        let json = settings.to_json().unwrap();
        assert!(!json.contains("stampTexture"));

        let back = BrushSettings::from_json(&json).unwrap();
        assert_eq!(back.brush_type, BrushType::Stamp);
        assert!(back.stamp_texture.is_none());
    }
}
