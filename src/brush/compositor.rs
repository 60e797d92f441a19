//! Dab compositor - writes one mask onto the canvas through a blend mode

use super::blend::composite_u8;
use super::dynamics::PressureDynamics;
use super::interpolation::DabPoint;
use super::mask::BrushMask;
use super::{BlendMode, BrushSettings};
use crate::core::brush_model::{validate_position, validate_pressure};
use crate::core::canvas::{Canvas, DirtyRect};
use crate::core::errors::CoreError;

/// A resolved application point
#[derive(Debug, Clone, Copy)]
pub struct Dab<'a> {
    /// Center X in canvas space
    pub x: f32,
    /// Center Y in canvas space
    pub y: f32,
    /// Effective diameter (after pressure)
    pub size: u32,
    /// Effective opacity (after pressure)
    pub opacity: f32,
    /// RGB color (0-255)
    pub color: [u8; 3],
    /// Brush the dab was resolved from (type and blend mode)
    pub settings: &'a BrushSettings,
}

impl Dab<'_> {
    /// Settings to synthesize this dab's mask with: the brush at the
    /// effective size
    pub fn mask_settings(&self) -> BrushSettings {
        BrushSettings {
            size: self.size,
            opacity: self.opacity,
            ..self.settings.clone()
        }
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.settings.blend_mode
    }
}

/// Apply pressure dynamics to a dab point
pub fn resolve_dab<'a>(
    settings: &'a BrushSettings,
    point: DabPoint,
    color: [u8; 3],
) -> Result<Dab<'a>, CoreError> {
    validate_position(point.x, point.y)?;
    validate_pressure(point.pressure)?;

    let dynamics = PressureDynamics::from_settings(settings);
    Ok(Dab {
        x: point.x,
        y: point.y,
        size: dynamics.size(point.pressure),
        opacity: dynamics.opacity(point.pressure),
        color,
        settings,
    })
}

/// Composite `mask` centered at (cx, cy).
///
/// Per pixel `α = mask / 255 × opacity`, then each color channel becomes
/// `s × (1 - α) + blend(s, color) × α`. A fourth channel is combined
/// source-over. Returns the touched rectangle, or `None` when the footprint
/// misses the canvas (not an error).
pub fn apply_mask(
    canvas: &mut Canvas<'_>,
    mask: &BrushMask,
    cx: f32,
    cy: f32,
    color: [u8; 3],
    opacity: f32,
    mode: BlendMode,
) -> Option<DirtyRect> {
    let size = mask.size() as i64;
    let half = size / 2;
    // Far-away positions saturate instead of overflowing, then clip to nothing
    let origin_x = (cx.round() as i64).saturating_sub(half);
    let origin_y = (cy.round() as i64).saturating_sub(half);

    let rect = canvas.clip(origin_x, origin_y, size, size)?;
    let has_alpha = canvas.has_alpha();

    for y in rect.top..rect.top + rect.height {
        let my = (y as i64 - origin_y) as u32;

        for x in rect.left..rect.left + rect.width {
            let mx = (x as i64 - origin_x) as u32;

            let alpha = mask.coverage(mx, my) * opacity;
            if alpha <= 0.0 {
                continue;
            }

            let pixel = canvas.pixel_mut(x, y);
            for (channel, &brush) in pixel.iter_mut().zip(color.iter()) {
                *channel = composite_u8(*channel, brush, mode, alpha);
            }
            if has_alpha {
                let dst_a = pixel[3] as f32 / 255.0;
                let out_a = dst_a + (1.0 - dst_a) * alpha;
                pixel[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Some(rect)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brush::{generate_mask, BrushType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hard_mask(size: u32) -> BrushMask {
        generate_mask(
            &BrushSettings::new(BrushType::HardRound, size),
            &mut StdRng::seed_from_u64(0),
        )
    }

    #[test]
    fn test_resolve_applies_pressure() {
        let settings = BrushSettings::new(BrushType::Round, 40);
        let dab = resolve_dab(
            &settings,
            DabPoint {
                x: 1.0,
                y: 2.0,
                pressure: 0.0,
            },
            [1, 2, 3],
        )
        .unwrap();
        assert_eq!(dab.size, 20);
        assert!((dab.opacity - 0.3).abs() < 1e-6);
        assert_eq!(dab.mask_settings().size, 20);
        assert_eq!(dab.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_resolve_rejects_bad_pressure() {
        let settings = BrushSettings::default();
        let err = resolve_dab(
            &settings,
            DabPoint {
                x: 0.0,
                y: 0.0,
                pressure: 2.0,
            },
            [0, 0, 0],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_dab_center_lands_on_position() {
        let mut data = vec![0u8; 20 * 20 * 3];
        let mut canvas = Canvas::new(&mut data, 20, 20, 3).unwrap();
        let rect = apply_mask(
            &mut canvas,
            &hard_mask(5),
            10.0,
            10.0,
            [255, 0, 0],
            1.0,
            BlendMode::Normal,
        )
        .unwrap();

        assert_eq!((rect.left, rect.top, rect.width, rect.height), (8, 8, 5, 5));
        assert_eq!(canvas.pixel(10, 10), &[255, 0, 0]);
        assert_eq!(canvas.pixel(5, 5), &[0, 0, 0]);
    }

    #[test]
    fn test_partial_footprint_is_clipped() {
        let mut data = vec![0u8; 10 * 10 * 3];
        let mut canvas = Canvas::new(&mut data, 10, 10, 3).unwrap();
        let rect = apply_mask(
            &mut canvas,
            &hard_mask(8),
            0.0,
            0.0,
            [9, 9, 9],
            1.0,
            BlendMode::Normal,
        )
        .unwrap();

        assert_eq!((rect.left, rect.top, rect.width, rect.height), (0, 0, 4, 4));
        assert_eq!(canvas.pixel(0, 0), &[9, 9, 9]);
    }

    #[test]
    fn test_outside_footprint_is_noop() {
        let mut data = vec![7u8; 10 * 10 * 4];
        let before = data.clone();
        let mut canvas = Canvas::new(&mut data, 10, 10, 4).unwrap();
        let rect = apply_mask(
            &mut canvas,
            &hard_mask(6),
            -50.0,
            30.0,
            [255, 255, 255],
            1.0,
            BlendMode::Normal,
        );
        assert!(rect.is_none());
        assert_eq!(data, before);
    }

    #[test]
    fn test_extreme_positions_do_not_overflow() {
        let mut data = vec![7u8; 10 * 10 * 3];
        let before = data.clone();
        let mut canvas = Canvas::new(&mut data, 10, 10, 3).unwrap();
        for (cx, cy) in [(1.0e20, 5.0), (-1.0e20, 5.0), (5.0, 1.0e20), (5.0, -1.0e20)] {
            let rect = apply_mask(
                &mut canvas,
                &hard_mask(7),
                cx,
                cy,
                [255, 255, 255],
                1.0,
                BlendMode::Normal,
            );
            assert!(rect.is_none());
        }
        assert_eq!(data, before);
    }

    #[test]
    fn test_alpha_channel_is_source_over() {
        let mut data = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut data, 4, 4, 4).unwrap();
        apply_mask(
            &mut canvas,
            &hard_mask(3),
            1.0,
            1.0,
            [200, 100, 50],
            0.5,
            BlendMode::Normal,
        );
        assert_eq!(canvas.pixel(1, 1), &[100, 50, 25, 128]);
        // Untouched pixel keeps its transparent alpha
        assert_eq!(canvas.pixel(3, 3)[3], 0);
    }

    #[test]
    fn test_multiply_darkens_existing_paint() {
        let mut data = vec![200u8; 6 * 6 * 3];
        let mut canvas = Canvas::new(&mut data, 6, 6, 3).unwrap();
        apply_mask(
            &mut canvas,
            &hard_mask(3),
            3.0,
            3.0,
            [128, 255, 0],
            1.0,
            BlendMode::Multiply,
        );
        let px = canvas.pixel(3, 3);
        assert_eq!(px[0], 100);
        assert_eq!(px[1], 200);
        assert_eq!(px[2], 0);
    }
}
