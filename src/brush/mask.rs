//! Brush mask synthesis - one coverage footprint per brush family
//!
//! A mask is a square single-channel image whose side is the *effective* dab
//! diameter. Values are 8-bit coverage (0 = transparent, 255 = opaque).
//!
//! Spray, Pencil and Watercolor draw from the random source passed in, so
//! their masks differ between calls unless the source is seeded. Every other
//! family is a pure function of the settings.

use super::raster::{add_saturating, fill_disk, fill_rotated_rect, gaussian_blur, resize_square};
use super::settings::normalize_degrees;
use super::{BrushSettings, BrushType};
use image::{GrayImage, Luma};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f32::consts::TAU;

/// Width of the anti-aliased rim of the calligraphy nib, in squared
/// normalized elliptical distance
const CALLIGRAPHY_RIM: f32 = 0.3;

const FLAT_WIDTH_RATIO: f32 = 0.3;
const FLAT_LENGTH_RATIO: f32 = 0.9;
const FLAT_BLUR_SIGMA: f32 = 0.5;

const PENCIL_GRAIN_MIN: u8 = 200;

const MARKER_POOL_VALUE: u8 = 128;

const WATERCOLOR_HARDNESS: f32 = 0.3;
const WATERCOLOR_BLUR_SIGMA: f32 = 1.5;

/// Square coverage mask for one dab
#[derive(Debug, Clone, PartialEq)]
pub struct BrushMask {
    image: GrayImage,
}

impl BrushMask {
    fn from_image(image: GrayImage) -> Self {
        debug_assert_eq!(image.width(), image.height());
        Self { image }
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Raw coverage at (x, y), 0-255
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Coverage at (x, y) normalized to [0, 1]
    #[inline]
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        self.get(x, y) as f32 / 255.0
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Sum of all coverage values, useful to compare mask density
    pub fn total_coverage(&self) -> u64 {
        self.image.pixels().map(|p| p.0[0] as u64).sum()
    }
}

/// Elliptical round tip: `roundness` squashes the local y-axis, `angle_deg`
/// orients it. A roundness of 1.0 is a plain disk.
#[derive(Debug, Clone, Copy)]
struct RoundTip {
    hardness: f32,
    roundness: f32,
    angle_deg: f32,
}

impl RoundTip {
    fn circle(hardness: f32) -> Self {
        Self {
            hardness,
            roundness: 1.0,
            angle_deg: 0.0,
        }
    }

    fn from_settings(settings: &BrushSettings, hardness: f32) -> Self {
        Self {
            hardness,
            roundness: settings.roundness,
            angle_deg: normalize_degrees(settings.angle),
        }
    }
}

/// Synthesize the mask for `settings`, whose `size` is the effective diameter.
///
/// A Stamp brush without a texture paints the Round mask at its configured
/// hardness.
pub fn generate_mask<R: Rng + ?Sized>(settings: &BrushSettings, rng: &mut R) -> BrushMask {
    let size = settings.size;
    tracing::trace!(
        "Generating {:?} mask: size={}, hardness={:.2}",
        settings.brush_type,
        size,
        settings.hardness
    );

    let image = match settings.brush_type {
        BrushType::Round | BrushType::SoftRound => {
            round_mask(size, RoundTip::from_settings(settings, settings.hardness))
        }
        BrushType::HardRound => round_mask(size, RoundTip::from_settings(settings, 1.0)),
        BrushType::Calligraphy => calligraphy_mask(
            size,
            normalize_degrees(settings.calligraphy_angle),
            settings.calligraphy_width,
        ),
        BrushType::Flat => flat_mask(size, normalize_degrees(settings.angle)),
        BrushType::Spray => spray_mask(size, settings.spray_density, settings.spray_jitter, rng),
        BrushType::Stamp => match &settings.stamp_texture {
            Some(texture) => resize_square(texture.image(), size),
            None => {
                tracing::debug!("Stamp brush has no texture, using round mask");
                round_mask(size, RoundTip::from_settings(settings, settings.hardness))
            }
        },
        BrushType::Pencil => pencil_mask(size, rng),
        BrushType::Marker => marker_mask(size, RoundTip::from_settings(settings, settings.hardness)),
        BrushType::Watercolor => watercolor_mask(size, rng),
    };

    BrushMask::from_image(image)
}

/// Mask center on the pixel grid (integer, like the dab anchor)
#[inline]
fn grid_center(size: u32) -> f32 {
    (size / 2) as f32
}

/// Radial falloff disk.
///
/// `alpha = clamp((1 - d) / (1 - 0.9 × hardness), 0, 1)` for normalized
/// distance `d ≤ 1`; hardness 1.0 gives a hard edge.
fn round_mask(size: u32, tip: RoundTip) -> GrayImage {
    let center = grid_center(size);
    let radius = size as f32 / 2.0;
    let falloff = 1.0 - tip.hardness * 0.9;

    let ycoef = 1.0 / tip.roundness.max(0.01);
    let (cos_a, sin_a) = {
        let rad = tip.angle_deg.to_radians();
        (rad.cos(), rad.sin())
    };
    let elliptical = tip.roundness < 1.0;

    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;

        let dist = if elliptical {
            let u = dx * cos_a + dy * sin_a;
            let v = (-dx * sin_a + dy * cos_a) * ycoef;
            (u * u + v * v).sqrt()
        } else {
            (dx * dx + dy * dy).sqrt()
        };
        let d = dist / radius;

        let alpha = if d > 1.0 {
            0.0
        } else if tip.hardness >= 1.0 {
            1.0
        } else {
            ((1.0 - d) / falloff).clamp(0.0, 1.0)
        };

        Luma([(alpha * 255.0) as u8])
    })
}

/// Rotated elliptical nib with an anti-aliased rim
fn calligraphy_mask(size: u32, angle_deg: f32, width_ratio: f32) -> GrayImage {
    let center = grid_center(size);
    let major = size as f32 / 2.0;
    let minor = major * width_ratio;
    let (cos_a, sin_a) = {
        let rad = angle_deg.to_radians();
        (rad.cos(), rad.sin())
    };

    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;

        let rx = dx * cos_a - dy * sin_a;
        let ry = dx * sin_a + dy * cos_a;
        let e = (rx * rx) / (major * major) + (ry * ry) / (minor * minor);

        let alpha = if e > 1.0 {
            0.0
        } else if e > 1.0 - CALLIGRAPHY_RIM {
            (1.0 - e) / CALLIGRAPHY_RIM
        } else {
            1.0
        };

        Luma([(alpha * 255.0) as u8])
    })
}

/// Oriented solid rectangle, lightly blurred to anti-alias the edges
fn flat_mask(size: u32, angle_deg: f32) -> GrayImage {
    let center = grid_center(size);
    let mut image = GrayImage::new(size, size);
    fill_rotated_rect(
        &mut image,
        center,
        center,
        size as f32 * FLAT_WIDTH_RATIO,
        size as f32 * FLAT_LENGTH_RATIO,
        angle_deg,
        255,
    );
    gaussian_blur(&image, FLAT_BLUR_SIGMA)
}

/// Max-combined soft particles scattered with uniform area density
fn spray_mask<R: Rng + ?Sized>(size: u32, density: u32, jitter: f32, rng: &mut R) -> GrayImage {
    let mut image = GrayImage::new(size, size);
    let center = (size / 2) as i64;
    let radius = size as f32 / 2.0;
    let spread = radius * (1.0 - jitter * 0.5);
    let particle_radius = 1 + (jitter * 3.0) as i64;
    let extent = size as i64;

    for _ in 0..density {
        let angle = rng.gen_range(0.0..TAU);
        // sqrt keeps the particle density uniform over the disc area
        let r = rng.gen::<f32>().sqrt() * spread;

        let x = center + (r * angle.cos()) as i64;
        let y = center + (r * angle.sin()) as i64;
        if x < 0 || x >= extent || y < 0 || y >= extent {
            continue;
        }

        let alpha: f32 = rng.gen_range(0.3..=1.0);
        stamp_particle(&mut image, x, y, particle_radius, alpha);
    }

    image
}

/// Soft particle with linear falloff, max-combined with what is already there
fn stamp_particle(image: &mut GrayImage, x: i64, y: i64, radius: i64, alpha: f32) {
    let width = image.width() as i64;
    let height = image.height() as i64;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let px = x + dx;
            let py = y + dy;
            if px < 0 || px >= width || py < 0 || py >= height {
                continue;
            }

            let falloff = ((dx * dx + dy * dy) as f32).sqrt() / radius as f32;
            if falloff > 1.0 {
                continue;
            }

            let value = (alpha * 255.0 * (1.0 - falloff)) as u8;
            let pixel = image.get_pixel_mut(px as u32, py as u32);
            pixel.0[0] = pixel.0[0].max(value);
        }
    }
}

/// Hard disk with per-pixel grain; grain only ever removes coverage
fn pencil_mask<R: Rng + ?Sized>(size: u32, rng: &mut R) -> GrayImage {
    let mut image = round_mask(size, RoundTip::circle(1.0));
    for pixel in image.pixels_mut() {
        if pixel.0[0] > 0 {
            let grain: u8 = rng.gen_range(PENCIL_GRAIN_MIN..=u8::MAX);
            pixel.0[0] = pixel.0[0].min(grain);
        }
    }
    image
}

/// Round tip plus a blurred half-intensity ink pool at the core
fn marker_mask(size: u32, tip: RoundTip) -> GrayImage {
    let mut image = round_mask(size, tip);

    let center = (size / 2) as i64;
    let mut pool = GrayImage::new(size, size);
    fill_disk(&mut pool, center, center, (size / 4) as i64, MARKER_POOL_VALUE);
    let pool = gaussian_blur(&pool, size as f32 / 8.0);

    add_saturating(&mut image, &pool);
    image
}

/// Soft disk with normally distributed pigment density, then diffused
fn watercolor_mask<R: Rng + ?Sized>(size: u32, rng: &mut R) -> GrayImage {
    let mut image = round_mask(size, RoundTip::circle(WATERCOLOR_HARDNESS));

    // offset ~ N(0, size/10); |offset| / (size/10) is a standard normal magnitude
    for pixel in image.pixels_mut() {
        if pixel.0[0] > 0 {
            let z: f32 = rng.sample(StandardNormal);
            pixel.0[0] = pigment(pixel.0[0], z);
        }
    }

    gaussian_blur(&image, WATERCOLOR_BLUR_SIGMA)
}

/// Scale base coverage by `0.7 + 0.3 × |z|`, saturating at 255
#[inline]
fn pigment(base: u8, z: f32) -> u8 {
    let value = base as f32 * (0.7 + 0.3 * z.abs());
    value.min(255.0) as u8
}
