//! Row-padded byte pixel buffer used both as render target and as texture.
//!
//! Pixels are addressed by normalized coordinates that wrap into `[0, 1)`, which
//! gives tiling for texture lookups and keeps render writes in range. Row 0 is the
//! bottom scanline (normalized `y = 0`), as in a bottom-up bitmap.
//!
//! A single reader/writer lock guards the bytes. The render loop takes the write
//! side once per frame and hands disjoint rows to its workers, so the lock only
//! ever contends with external readers taking a snapshot.

use std::fmt;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use glam::Vec3A;
use image::RgbImage;
use log::{debug, warn};

use crate::error::{Error, Result};

/// Linear RGB color with components nominally in `[0, 1]`.
pub type Color = Vec3A;

/// 8-bit RGB color stored in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl PixelColor {
    /// Black.
    pub const BLACK: PixelColor = PixelColor::new(0, 0, 0);
    /// Marker used for textures that failed to load.
    pub const MISSING: PixelColor = PixelColor::new(255, 0, 0);

    /// Build from byte channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Quantize a linear color, clamping to `[0, 1]`.
    pub fn from_color(color: Color) -> Self {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(quantize(color.x), quantize(color.y), quantize(color.z))
    }

    /// Expand to a linear color in `[0, 1]`.
    pub fn to_color(self) -> Color {
        Color::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }
}

/// Channel layout of a buffer; every channel is one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Three channels: R, G, B.
    #[default]
    Rgb8,
    /// Four channels: R, G, B, A. Writes set alpha to opaque.
    Rgba8,
}

impl PixelFormat {
    /// Number of channels per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        self.channels()
    }

    /// Write `color` into the first pixel of `dst`.
    pub(crate) fn write(self, dst: &mut [u8], color: PixelColor) {
        dst[0] = color.r;
        dst[1] = color.g;
        dst[2] = color.b;
        if self == PixelFormat::Rgba8 {
            dst[3] = u8::MAX;
        }
    }

    fn read(self, src: &[u8]) -> PixelColor {
        PixelColor::new(src[0], src[1], src[2])
    }
}

/// Row stride for `width` pixels, padded to a multiple of four bytes.
pub fn aligned_stride(width: usize, format: PixelFormat) -> usize {
    (width * format.bytes_per_pixel() + 3) & !3
}

/// Wrap a normalized coordinate into `[0, 1)` as `|x mod 1|`.
pub fn wrap_unit(x: f32) -> f32 {
    let wrapped = (x % 1.0).abs();
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// Byte pixel buffer with thread-safe access by normalized coordinate.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    data: RwLock<Vec<u8>>,
}

impl PixelBuffer {
    /// Black RGB buffer of `width` x `height` pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_format(width, height, PixelFormat::Rgb8)
    }

    /// Black buffer with an explicit channel layout.
    ///
    /// Zero dimensions are raised to one pixel.
    pub fn with_format(width: usize, height: usize, format: PixelFormat) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let stride = aligned_stride(width, format);
        Self {
            width,
            height,
            stride,
            format,
            data: RwLock::new(vec![0; stride * height]),
        }
    }

    /// 1x1 buffer holding a single color.
    pub fn solid(color: PixelColor) -> Self {
        let buffer = Self::new(1, 1);
        buffer.set_pixel(0.0, 0.0, color);
        buffer
    }

    /// Copy a decoded image; the image's top row becomes the buffer's last row.
    pub fn from_image(image: &RgbImage) -> Self {
        let buffer = Self::new(image.width() as usize, image.height() as usize);
        {
            let mut data = buffer.write();
            let (width, height, stride) = (buffer.width, buffer.height, buffer.stride);
            for (y, image_row) in image.rows().enumerate() {
                let row = height - 1 - y;
                let start = row * stride;
                for (x, pixel) in image_row.enumerate().take(width) {
                    let offset = start + x * 3;
                    data[offset..offset + 3].copy_from_slice(&pixel.0);
                }
            }
        }
        buffer
    }

    /// Decode an image file into a texture.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgb8();
        debug!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(&image))
    }

    /// Decode an image file, falling back to a 1x1 red texture on failure.
    pub fn load_or_missing(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load texture {}: {}", path.display(), e);
            Self::solid(PixelColor::MISSING)
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Channel layout.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Total size of the byte storage.
    pub fn byte_len(&self) -> usize {
        self.stride * self.height
    }

    /// Zero every byte.
    pub fn clear(&self) {
        self.write().fill(0);
    }

    /// Write a color at normalized coordinates, wrapping both into `[0, 1)`.
    pub fn set_pixel(&self, x: f32, y: f32, color: PixelColor) {
        let offset = self.offset_of(x, y);
        let mut data = self.write();
        self.format.write(&mut data[offset..], color);
    }

    /// Read the color at normalized coordinates, wrapping both into `[0, 1)`.
    pub fn color_at(&self, x: f32, y: f32) -> PixelColor {
        let offset = self.offset_of(x, y);
        let data = self.read();
        self.format.read(&data[offset..])
    }

    /// Read the color at integer pixel coordinates.
    pub fn pixel(&self, col: usize, row: usize) -> Option<PixelColor> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let data = self.read();
        Some(self.format.read(&data[self.offset(col, row)..]))
    }

    /// Copy of the raw bytes, taken under the read lock.
    pub fn snapshot(&self) -> Vec<u8> {
        self.read().clone()
    }

    /// Byte-for-byte copy into caller-owned memory of the same layout.
    pub fn resolve_to_bitmap(&self, dst: &mut [u8]) -> Result<()> {
        let data = self.read();
        if dst.len() != data.len() {
            return Err(Error::BufferSize {
                expected: data.len(),
                actual: dst.len(),
            });
        }
        dst.copy_from_slice(&data);
        Ok(())
    }

    /// Top-down RGB image of the buffer, dropping padding and alpha.
    pub fn to_image(&self) -> RgbImage {
        let data = self.read();
        let bpp = self.format.bytes_per_pixel();
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let row = self.height - 1 - y as usize;
            let offset = row * self.stride + x as usize * bpp;
            image::Rgb([data[offset], data[offset + 1], data[offset + 2]])
        })
    }

    /// Byte offset of pixel `(col, row)`.
    pub fn offset(&self, col: usize, row: usize) -> usize {
        row * self.stride + col * self.format.bytes_per_pixel()
    }

    /// Exclusive access to the bytes, held for a whole render pass.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<u8>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn offset_of(&self, x: f32, y: f32) -> usize {
        let col = ((wrap_unit(x) * self.width as f32) as usize).min(self.width - 1);
        let row = ((wrap_unit(y) * self.height as f32) as usize).min(self.height - 1);
        self.offset(col, row)
    }
}

impl Clone for PixelBuffer {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
            data: RwLock::new(self.snapshot()),
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish()
    }
}
