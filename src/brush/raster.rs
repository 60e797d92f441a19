//! Raster helpers used by mask synthesis.
//!
//! Resampling and blurring go through `image::imageops`; the shape fills are
//! simple per-pixel coverage tests on the pixel grid.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

/// Resample a coverage texture to `size × size` (bilinear)
pub fn resize_square(texture: &GrayImage, size: u32) -> GrayImage {
    if texture.dimensions() == (size, size) {
        return texture.clone();
    }
    imageops::resize(texture, size, size, FilterType::Triangle)
}

/// Gaussian blur with the given standard deviation
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    imageops::blur(image, sigma)
}

/// Fill a disk of integer `radius` centered on pixel (cx, cy)
pub fn fill_disk(image: &mut GrayImage, cx: i64, cy: i64, radius: i64, value: u8) {
    let r2 = radius * radius;
    let (width, height) = image.dimensions();

    for y in (cy - radius).max(0)..(cy + radius + 1).min(height as i64) {
        for x in (cx - radius).max(0)..(cx + radius + 1).min(width as i64) {
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= r2 {
                image.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
    }
}

/// Fill a rectangle of `width × length` centered on (cx, cy), rotated by
/// `angle_deg` degrees. `length` runs along the rectangle's local y-axis.
pub fn fill_rotated_rect(
    image: &mut GrayImage,
    cx: f32,
    cy: f32,
    width: f32,
    length: f32,
    angle_deg: f32,
    value: u8,
) {
    let (cos_a, sin_a) = {
        let rad = angle_deg.to_radians();
        (rad.cos(), rad.sin())
    };
    let half_w = width / 2.0;
    let half_l = length / 2.0;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;

        // Into the rectangle's frame
        let u = dx * cos_a + dy * sin_a;
        let v = -dx * sin_a + dy * cos_a;

        if u.abs() <= half_w && v.abs() <= half_l {
            *pixel = Luma([value]);
        }
    }
}

/// `dst = min(dst + src, 255)` pixel by pixel; both images share dimensions
pub fn add_saturating(dst: &mut GrayImage, src: &GrayImage) {
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        d.0[0] = d.0[0].saturating_add(s.0[0]);
    }
}
