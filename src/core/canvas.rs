//! Mutable view over a caller-owned 8-bit pixel buffer.
//!
//! The engine never allocates or resizes canvases. It borrows the pixels for
//! the duration of one dab or stroke and writes only inside the bounds.

use crate::core::errors::CoreError;
use image::{RgbImage, RgbaImage};

/// Axis-aligned pixel rectangle (left, top, width, height) in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl DirtyRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);

        DirtyRect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Exclusive-access view of an interleaved RGB or RGBA buffer
#[derive(Debug)]
pub struct Canvas<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    channels: u8,
}

impl<'a> Canvas<'a> {
    /// Wrap a raw buffer. `data.len()` must equal `width * height * channels`.
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidCanvas(format!(
                "Canvas dimensions must be non-zero (got {}x{})",
                width, height
            )));
        }
        if channels != 3 && channels != 4 {
            return Err(CoreError::InvalidCanvas(format!(
                "Canvas must have 3 or 4 channels (got {})",
                channels
            )));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(CoreError::InvalidCanvas(format!(
                "Buffer holds {} bytes, expected {} for {}x{}x{}",
                data.len(),
                expected,
                width,
                height,
                channels
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Pixel at (x, y); callers guarantee the coordinate is in bounds
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let idx = self.index(x, y);
        &self.data[idx..idx + self.channels as usize]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let idx = self.index(x, y);
        let channels = self.channels as usize;
        &mut self.data[idx..idx + channels]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    /// Clip a rectangle given in signed canvas coordinates to the canvas bounds
    pub fn clip(&self, left: i64, top: i64, width: i64, height: i64) -> Option<DirtyRect> {
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = left.saturating_add(width).min(self.width as i64);
        let y1 = top.saturating_add(height).min(self.height as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(DirtyRect {
            left: x0 as u32,
            top: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }
}

impl<'a> From<&'a mut RgbImage> for Canvas<'a> {
    fn from(image: &'a mut RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: &mut **image,
            width,
            height,
            channels: 3,
        }
    }
}

impl<'a> From<&'a mut RgbaImage> for Canvas<'a> {
    fn from(image: &'a mut RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: &mut **image,
            width,
            height,
            channels: 4,
        }
    }
}
