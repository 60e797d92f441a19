//! Validation of brush configuration and stroke input at the engine boundary.

use crate::brush::BrushSettings;
use crate::core::errors::CoreError;

/// Smallest distance between two dabs, in pixels (`size × spacing`)
pub const MIN_DAB_STEP: f32 = 0.1;

pub fn validate_brush_settings(settings: &BrushSettings) -> Result<(), CoreError> {
    if settings.size < 1 {
        return Err(CoreError::InvalidConfig(
            "Brush size must be at least 1 pixel".to_string(),
        ));
    }
    check_unit("opacity", settings.opacity)?;
    check_unit("hardness", settings.hardness)?;
    check_unit("spray jitter", settings.spray_jitter)?;

    if !settings.spacing.is_finite() || settings.spacing <= 0.0 {
        return Err(CoreError::InvalidConfig(
            "Brush spacing must be a positive finite number".to_string(),
        ));
    }
    if settings.spacing_px() < MIN_DAB_STEP {
        return Err(CoreError::InvalidConfig(format!(
            "Brush spacing of {} at size {} is below the {} px minimum dab step",
            settings.spacing, settings.size, MIN_DAB_STEP
        )));
    }
    if !settings.roundness.is_finite() || settings.roundness <= 0.0 || settings.roundness > 1.0 {
        return Err(CoreError::InvalidConfig(
            "Brush roundness must be in (0, 1]".to_string(),
        ));
    }
    if !settings.calligraphy_width.is_finite()
        || settings.calligraphy_width <= 0.0
        || settings.calligraphy_width > 1.0
    {
        return Err(CoreError::InvalidConfig(
            "Calligraphy width must be in (0, 1]".to_string(),
        ));
    }
    if !settings.angle.is_finite() || !settings.calligraphy_angle.is_finite() {
        return Err(CoreError::InvalidConfig(
            "Brush angles must be finite numbers".to_string(),
        ));
    }
    Ok(())
}

/// Pressure arrives normalized; anything outside [0, 1] is a caller bug
pub fn validate_pressure(pressure: f32) -> Result<(), CoreError> {
    if !pressure.is_finite() || !(0.0..=1.0).contains(&pressure) {
        return Err(CoreError::InvalidInput(format!(
            "Pressure must be in [0, 1] (got {})",
            pressure
        )));
    }
    Ok(())
}

pub fn validate_position(x: f32, y: f32) -> Result<(), CoreError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(CoreError::InvalidInput(
            "Dab coordinates must be finite numbers".to_string(),
        ));
    }
    Ok(())
}

fn check_unit(name: &str, value: f32) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::InvalidConfig(format!(
            "Brush {} must be in [0, 1] (got {})",
            name, value
        )));
    }
    Ok(())
}
