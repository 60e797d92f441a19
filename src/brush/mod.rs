//! Brush engine module - mask synthesis, dab spacing and compositing

pub mod blend;
mod cache;
mod compositor;
mod dynamics;
mod engine;
mod interpolation;
mod mask;
mod raster;
mod settings;


pub use blend::{blend_channel, composite_channel};
pub use cache::{MaskCache, MaskCacheStats, MaskKey};
pub use compositor::{apply_mask, resolve_dab, Dab};
pub use dynamics::{effective_opacity, effective_size, PressureDynamics};
pub use engine::{BrushEngine, EngineConfig};
pub use interpolation::{interpolate_segment, interpolate_stroke, path_length, DabPoint, StrokeSample};
pub use mask::{generate_mask, BrushMask};
pub use settings::{BrushSettings, StampTexture};

use serde::{Deserialize, Serialize};

/// Brush families, each with its own mask synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BrushType {
    #[default]
    Round,
    SoftRound,
    HardRound,
    Calligraphy,
    Flat,
    Spray,
    Stamp,
    Pencil,
    Marker,
    Watercolor,
}

impl BrushType {
    pub const ALL: [BrushType; 10] = [
        BrushType::Round,
        BrushType::SoftRound,
        BrushType::HardRound,
        BrushType::Calligraphy,
        BrushType::Flat,
        BrushType::Spray,
        BrushType::Stamp,
        BrushType::Pencil,
        BrushType::Marker,
        BrushType::Watercolor,
    ];

    /// Types whose masks draw from the random source.
    ///
    /// Masks of these types differ from call to call unless the engine was
    /// seeded; every other type is a pure function of its settings.
    pub fn is_randomized(&self) -> bool {
        matches!(
            self,
            BrushType::Spray | BrushType::Pencil | BrushType::Watercolor
        )
    }
}

/// Per-channel compositing operators applied before alpha blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    Darken,
    Lighten,
    Add,
    Subtract,
}

impl BlendMode {
    pub const ALL: [BlendMode; 10] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Add,
        BlendMode::Subtract,
    ];
}
