//! Pressure dynamics - maps a pressure sample to effective size and opacity

use super::BrushSettings;

/// Opacity after pressure: `base × (0.3 + 0.7 × pressure)`
#[inline]
pub fn effective_opacity(base_opacity: f32, pressure: f32) -> f32 {
    base_opacity * (0.3 + 0.7 * pressure)
}

/// Diameter after pressure: `round(base × (0.5 + 0.5 × pressure))`, never below 1
#[inline]
pub fn effective_size(base_size: u32, pressure: f32) -> u32 {
    let size = (base_size as f32 * (0.5 + 0.5 * pressure)).round();
    (size as u32).max(1)
}

/// Pressure mapping gated by the settings' pressure flags
#[derive(Debug, Clone, Copy)]
pub struct PressureDynamics {
    base_size: u32,
    base_opacity: f32,
    affects_size: bool,
    affects_opacity: bool,
}

impl PressureDynamics {
    pub fn from_settings(settings: &BrushSettings) -> Self {
        Self {
            base_size: settings.size,
            base_opacity: settings.opacity,
            affects_size: settings.pressure_affects_size,
            affects_opacity: settings.pressure_affects_opacity,
        }
    }

    /// Effective diameter for a (validated) pressure sample
    pub fn size(&self, pressure: f32) -> u32 {
        if self.affects_size {
            effective_size(self.base_size, pressure)
        } else {
            self.base_size
        }
    }

    /// Effective opacity for a (validated) pressure sample
    pub fn opacity(&self, pressure: f32) -> f32 {
        if self.affects_opacity {
            effective_opacity(self.base_opacity, pressure)
        } else {
            self.base_opacity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pressure_keeps_base_values() {
        assert_eq!(effective_size(40, 1.0), 40);
        assert!((effective_opacity(0.8, 1.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_pressure_halves_size_and_scales_opacity() {
        assert_eq!(effective_size(40, 0.0), 20);
        assert!((effective_opacity(1.0, 0.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn size_rounds_and_stays_positive() {
        // 15 * 0.75 = 11.25
        assert_eq!(effective_size(15, 0.5), 11);
        // 3.5 rounds away from zero
        assert_eq!(effective_size(7, 0.0), 4);
        assert_eq!(effective_size(1, 0.0), 1);
    }

    #[test]
    fn flags_gate_the_mapping() {
        let settings = BrushSettings {
            size: 30,
            opacity: 0.5,
            pressure_affects_size: false,
            pressure_affects_opacity: true,
            ..Default::default()
        };
        let dynamics = PressureDynamics::from_settings(&settings);

        assert_eq!(dynamics.size(0.0), 30);
        assert!((dynamics.opacity(0.0) - 0.15).abs() < 1e-6);

        let settings = BrushSettings {
            pressure_affects_size: true,
            pressure_affects_opacity: false,
            ..settings
        };
        let dynamics = PressureDynamics::from_settings(&settings);
        assert_eq!(dynamics.size(0.0), 15);
        assert_eq!(dynamics.opacity(0.0), 0.5);
    }

    #[test]
    fn higher_pressure_gives_larger_dabs() {
        let dynamics = PressureDynamics::from_settings(&BrushSettings::new(
            crate::brush::BrushType::Round,
            50,
        ));
        assert!(dynamics.size(0.8) > dynamics.size(0.2));
        assert!(dynamics.opacity(0.8) > dynamics.opacity(0.2));
    }
}
