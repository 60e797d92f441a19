//! paintcore - the procedural painting core of a raster editor
//!
//! Synthesizes brush footprints for ten brush families, resamples pointer
//! paths into evenly spaced dabs, applies pressure dynamics and composites
//! each dab onto a caller-owned canvas through one of ten blend modes.

pub mod brush;
pub mod core;

pub use crate::brush::{BlendMode, BrushEngine, BrushSettings, BrushType, StrokeSample};
pub use crate::core::canvas::{Canvas, DirtyRect};
pub use crate::core::errors::CoreError;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber (`RUST_LOG` overrides the filter).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paintcore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("paintcore logging initialized");
    }
}
