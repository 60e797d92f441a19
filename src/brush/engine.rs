//! Brush engine - turns strokes into dabs and composites them in path order

use super::cache::{MaskCache, MaskCacheStats, MaskKey};
use super::compositor::{apply_mask, resolve_dab, Dab};
use super::dynamics::PressureDynamics;
use super::interpolation::{interpolate_segment, interpolate_stroke, DabPoint, StrokeSample};
use super::mask::{generate_mask, BrushMask};
use super::BrushSettings;
use crate::core::brush_model::validate_pressure;
use crate::core::canvas::{Canvas, DirtyRect};
use crate::core::errors::CoreError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Engine-level tuning, independent of any brush
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Reuse masks of deterministic brushes between dabs
    pub mask_cache_enabled: bool,
    /// Maximum number of cached masks
    pub mask_cache_capacity: usize,
    /// Synthesize a stroke's masks in parallel before compositing
    pub parallel_mask_precompute: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mask_cache_enabled: true,
            mask_cache_capacity: 256,
            parallel_mask_precompute: true,
        }
    }
}

/// The main brush engine.
///
/// Owns the random source used by Spray, Pencil and Watercolor masks and the
/// mask cache. The canvas is borrowed exclusively per call; dabs of one
/// stroke are always composited sequentially.
pub struct BrushEngine {
    config: EngineConfig,
    cache: MaskCache,
    rng: StdRng,
}

impl BrushEngine {
    /// Create a new brush engine with default settings and an entropy-seeded
    /// random source
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create with custom engine configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            cache: MaskCache::new(config.mask_cache_capacity),
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a fixed seed; randomized brushes become reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::new().seeded(seed)
    }

    /// Replace the random source with a seeded one
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> MaskCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Synthesize the mask for `settings` at its nominal size
    pub fn generate_mask(&mut self, settings: &BrushSettings) -> Result<BrushMask, CoreError> {
        settings.validate()?;
        Ok(generate_mask(settings, &mut self.rng))
    }

    /// Apply a single dab centered at (x, y)
    ///
    /// Returns the touched rectangle, or `None` when the dab misses the canvas.
    pub fn apply_dab(
        &mut self,
        canvas: &mut Canvas<'_>,
        x: f32,
        y: f32,
        color: [u8; 3],
        settings: &BrushSettings,
        pressure: f32,
    ) -> Result<Option<DirtyRect>, CoreError> {
        settings.validate()?;
        let dab = resolve_dab(settings, DabPoint { x, y, pressure }, color)?;
        Ok(self.composite(canvas, &dab))
    }

    /// Apply a stroke: every sample pair is resampled at the brush spacing and
    /// the resulting dabs are composited in order.
    ///
    /// All samples are validated before the canvas is touched.
    pub fn apply_stroke(
        &mut self,
        canvas: &mut Canvas<'_>,
        samples: &[StrokeSample],
        color: [u8; 3],
        settings: &BrushSettings,
    ) -> Result<Option<DirtyRect>, CoreError> {
        settings.validate()?;
        for sample in samples {
            sample.validate()?;
        }

        let points = interpolate_stroke(samples, settings);
        tracing::debug!(
            "Applying {:?} stroke: {} samples -> {} dabs",
            settings.brush_type,
            samples.len(),
            points.len()
        );

        self.composite_points(canvas, &points, color, settings)
    }

    /// Apply a straight segment at constant pressure
    pub fn apply_segment(
        &mut self,
        canvas: &mut Canvas<'_>,
        start: (f32, f32),
        end: (f32, f32),
        color: [u8; 3],
        settings: &BrushSettings,
        pressure: f32,
    ) -> Result<Option<DirtyRect>, CoreError> {
        settings.validate()?;
        let p0 = StrokeSample::with_pressure(start.0, start.1, pressure)?;
        let p1 = StrokeSample::with_pressure(end.0, end.1, pressure)?;

        let points = interpolate_segment(&p0, &p1, settings.size, settings.spacing);
        self.composite_points(canvas, &points, color, settings)
    }

    /// Synthesize and cache the masks for every distinct effective size the
    /// given pressures produce, in parallel. Returns how many masks were built.
    ///
    /// Randomized brushes and textured stamps are skipped.
    pub fn precompute_masks(
        &self,
        settings: &BrushSettings,
        pressures: &[f32],
    ) -> Result<usize, CoreError> {
        settings.validate()?;
        for &pressure in pressures {
            validate_pressure(pressure)?;
        }
        if !self.config.mask_cache_enabled {
            return Ok(0);
        }

        let dynamics = PressureDynamics::from_settings(settings);
        let sizes: BTreeSet<u32> = pressures.iter().map(|&p| dynamics.size(p)).collect();

        let pending: Vec<(MaskKey, BrushSettings)> = sizes
            .into_iter()
            .filter_map(|size| {
                let sized = BrushSettings {
                    size,
                    ..settings.clone()
                };
                let key = MaskKey::for_settings(&sized)?;
                (!self.cache.contains(&key)).then_some((key, sized))
            })
            .collect();

        let masks: Vec<(MaskKey, BrushMask)> = pending
            .into_par_iter()
            .map(|(key, sized)| {
                // Cacheable brushes never draw from the random source
                let mask = generate_mask(&sized, &mut rand::thread_rng());
                (key, mask)
            })
            .collect();

        let count = masks.len();
        for (key, mask) in masks {
            self.cache.insert(key, Arc::new(mask));
        }

        tracing::debug!("Precomputed {} {:?} masks", count, settings.brush_type);
        Ok(count)
    }

    fn composite_points(
        &mut self,
        canvas: &mut Canvas<'_>,
        points: &[DabPoint],
        color: [u8; 3],
        settings: &BrushSettings,
    ) -> Result<Option<DirtyRect>, CoreError> {
        if self.config.parallel_mask_precompute && points.len() > 1 {
            let pressures: Vec<f32> = points.iter().map(|p| p.pressure).collect();
            self.precompute_masks(settings, &pressures)?;
        }

        let mut dirty: Option<DirtyRect> = None;
        for point in points {
            let dab = resolve_dab(settings, *point, color)?;
            if let Some(rect) = self.composite(canvas, &dab) {
                dirty = Some(dirty.map_or(rect, |d| d.union(&rect)));
            }
        }
        Ok(dirty)
    }

    fn composite(&mut self, canvas: &mut Canvas<'_>, dab: &Dab<'_>) -> Option<DirtyRect> {
        tracing::debug!(
            "Dab at ({:.1}, {:.1}): size={}, opacity={:.2}, mode={:?}",
            dab.x,
            dab.y,
            dab.size,
            dab.opacity,
            dab.blend_mode()
        );

        let mask = self.mask_for(dab);
        let rect = apply_mask(
            canvas,
            &mask,
            dab.x,
            dab.y,
            dab.color,
            dab.opacity,
            dab.blend_mode(),
        );
        if rect.is_none() {
            tracing::debug!("  -> skipped: footprint outside canvas");
        }
        rect
    }

    fn mask_for(&mut self, dab: &Dab<'_>) -> Arc<BrushMask> {
        let settings = dab.mask_settings();

        if self.config.mask_cache_enabled {
            if let Some(key) = MaskKey::for_settings(&settings) {
                let rng = &mut self.rng;
                return self
                    .cache
                    .get_or_insert_with(key, || generate_mask(&settings, rng));
            }
        }

        Arc::new(generate_mask(&settings, &mut self.rng))
    }
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brush::{BlendMode, BrushType};

    fn blank(width: u32, height: u32, channels: u8) -> Vec<u8> {
        vec![255u8; (width * height * channels as u32) as usize]
    }

    #[test]
    fn test_brush_engine_creation() {
        let engine = BrushEngine::new();
        assert!(engine.config().mask_cache_enabled);
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn test_invalid_settings_fail_before_painting() {
        let mut data = blank(8, 8, 3);
        let before = data.clone();
        let mut canvas = Canvas::new(&mut data, 8, 8, 3).unwrap();
        let settings = BrushSettings {
            opacity: 1.5,
            ..Default::default()
        };

        let mut engine = BrushEngine::with_seed(1);
        let result = engine.apply_dab(&mut canvas, 4.0, 4.0, [0, 0, 0], &settings, 1.0);
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
        assert_eq!(data, before);
    }

    #[test]
    fn test_invalid_sample_rejects_whole_stroke() {
        let mut data = blank(16, 16, 3);
        let before = data.clone();
        let mut canvas = Canvas::new(&mut data, 16, 16, 3).unwrap();
        let samples = [
            StrokeSample::new(2.0, 2.0),
            StrokeSample {
                x: 10.0,
                y: 10.0,
                pressure: 3.0,
            },
        ];

        let mut engine = BrushEngine::with_seed(1);
        let result = engine.apply_stroke(&mut canvas, &samples, [0, 0, 0], &BrushSettings::default());
        assert!(result.is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn test_stroke_reports_dirty_rect() {
        let mut data = blank(64, 64, 4);
        let mut canvas = Canvas::new(&mut data, 64, 64, 4).unwrap();
        let settings = BrushSettings::new(BrushType::HardRound, 8);

        let mut engine = BrushEngine::with_seed(1);
        let rect = engine
            .apply_segment(&mut canvas, (10.0, 20.0), (50.0, 20.0), [0, 0, 0], &settings, 1.0)
            .unwrap()
            .unwrap();

        assert_eq!(rect.left, 6);
        assert_eq!(rect.top, 16);
        assert_eq!(rect.width, 48);
        assert_eq!(rect.height, 8);
        assert_eq!(canvas.pixel(30, 20), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_cache_reused_across_dabs() {
        let mut data = blank(64, 64, 3);
        let mut canvas = Canvas::new(&mut data, 64, 64, 3).unwrap();
        let settings = BrushSettings::new(BrushType::Calligraphy, 12);
        let samples = [StrokeSample::new(5.0, 5.0), StrokeSample::new(60.0, 5.0)];

        let mut engine = BrushEngine::with_seed(1);
        engine
            .apply_stroke(&mut canvas, &samples, [10, 20, 30], &settings)
            .unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.entries, 1);
        assert!(stats.hits > 1);
    }

    #[test]
    fn test_precompute_builds_each_size_once() {
        let engine = BrushEngine::with_seed(1);
        let settings = BrushSettings::new(BrushType::Round, 20);

        let built = engine
            .precompute_masks(&settings, &[0.0, 0.0, 0.5, 1.0, 1.0])
            .unwrap();
        assert_eq!(built, 3);
        assert_eq!(engine.precompute_masks(&settings, &[0.5]).unwrap(), 0);

        let spray = BrushSettings::new(BrushType::Spray, 20);
        assert_eq!(engine.precompute_masks(&spray, &[0.3, 0.9]).unwrap(), 0);
    }

    #[test]
    fn test_cache_does_not_change_output() {
        let settings = BrushSettings {
            hardness: 0.2,
            blend_mode: BlendMode::Overlay,
            ..BrushSettings::new(BrushType::Marker, 14)
        };
        let samples = [
            StrokeSample::with_pressure(4.0, 4.0, 0.2).unwrap(),
            StrokeSample::with_pressure(40.0, 30.0, 0.9).unwrap(),
        ];

        let mut cached = vec![90u8; 48 * 48 * 3];
        let mut uncached = cached.clone();

        BrushEngine::with_seed(3)
            .apply_stroke(
                &mut Canvas::new(&mut cached, 48, 48, 3).unwrap(),
                &samples,
                [200, 30, 120],
                &settings,
            )
            .unwrap();

        let config = EngineConfig {
            mask_cache_enabled: false,
            ..Default::default()
        };
        BrushEngine::with_config(config)
            .apply_stroke(
                &mut Canvas::new(&mut uncached, 48, 48, 3).unwrap(),
                &samples,
                [200, 30, 120],
                &settings,
            )
            .unwrap();

        assert_eq!(cached, uncached);
    }

    #[test]
    fn test_generate_mask_validates() {
        let mut engine = BrushEngine::with_seed(1);
        assert!(engine
            .generate_mask(&BrushSettings::new(BrushType::Flat, 0))
            .is_err());
        let mask = engine
            .generate_mask(&BrushSettings::new(BrushType::Flat, 9))
            .unwrap();
        assert_eq!(mask.size(), 9);
    }
}
