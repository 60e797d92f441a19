//! Blend mode algorithms for dab compositing
//!
//! All functions work on straight (non-premultiplied) color normalized to
//! [0, 1]. `s` is the existing canvas value, `f` the brush color.

use super::BlendMode;

/// Blend a single channel. Pure, no alpha involved.
#[inline]
pub fn blend_channel(s: f32, f: f32, mode: BlendMode) -> f32 {
    match mode {
        BlendMode::Normal => f,
        BlendMode::Multiply => s * f,
        BlendMode::Screen => 1.0 - (1.0 - s) * (1.0 - f),
        BlendMode::Overlay => hard_light(f, s),
        BlendMode::SoftLight => soft_light(s, f),
        BlendMode::HardLight => hard_light(s, f),
        BlendMode::Darken => s.min(f),
        BlendMode::Lighten => s.max(f),
        BlendMode::Add => (s + f).clamp(0.0, 1.0),
        BlendMode::Subtract => (s - f).clamp(0.0, 1.0),
    }
}

/// Blend a whole color, channel by channel
pub fn blend(src: [f32; 3], brush: [f32; 3], mode: BlendMode) -> [f32; 3] {
    [
        blend_channel(src[0], brush[0], mode),
        blend_channel(src[1], brush[1], mode),
        blend_channel(src[2], brush[2], mode),
    ]
}

/// Blend then alpha-composite over the source:
/// `s × (1 - α) + blend(s, f) × α`
#[inline]
pub fn composite_channel(s: f32, f: f32, mode: BlendMode, alpha: f32) -> f32 {
    s * (1.0 - alpha) + blend_channel(s, f, mode) * alpha
}

/// 8-bit variant of [`composite_channel`], rounding to the nearest level
#[inline]
pub fn composite_u8(s: u8, f: u8, mode: BlendMode, alpha: f32) -> u8 {
    let out = composite_channel(s as f32 / 255.0, f as f32 / 255.0, mode, alpha);
    (out * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Hard light: the brush decides between multiply and screen.
/// Overlay is the same operator with the roles swapped.
#[inline]
fn hard_light(s: f32, f: f32) -> f32 {
    if f <= 0.5 {
        2.0 * s * f
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - f)
    }
}

/// Soft light (W3C compositing formula)
#[inline]
fn soft_light(s: f32, f: f32) -> f32 {
    if f <= 0.5 {
        s - (1.0 - 2.0 * f) * s * (1.0 - s)
    } else {
        let d = if s <= 0.25 {
            ((16.0 * s - 12.0) * s + 4.0) * s
        } else {
            s.sqrt()
        };
        s + (2.0 * f - 1.0) * (d - s)
    }
}
