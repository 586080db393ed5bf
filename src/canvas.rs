//! Frame synthesis.
//!
//! The canvas owns the frame's [`PixelBuffer`] and fills it by casting one view
//! ray per pixel center. Rows are independent work items: each keeps its own
//! depth line, so the nearest hit wins per pixel no matter how many surfaces
//! cover it or in which order they are listed. The buffer's write lock is taken
//! once per frame and split into disjoint row slices, which makes the parallel
//! and sequential renders byte-identical.

use std::ops::Range;
use std::time::{Duration, Instant};

use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::camera::{Camera, ScreenRect};
use crate::error::Result;
use crate::hittable::Hittable;
use crate::interval::Interval;
use crate::material::MaterialTable;
use crate::pixel_buffer::{PixelBuffer, PixelFormat};
use crate::surface::Surface;

/// Switches for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Split rows across the rayon thread pool.
    pub parallel: bool,
    /// Only scan the pixels inside each surface's screen bounds.
    pub cull: bool,
    /// Show a progress bar on the terminal.
    pub progress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            cull: true,
            progress: false,
        }
    }
}

/// Counters collected during a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Ray-surface queries performed.
    pub rays_cast: u64,
    /// Queries that produced a hit nearer than everything before it.
    pub hits: u64,
    /// Wall-clock time of the pass.
    pub elapsed: Duration,
}

impl RenderStats {
    fn merge(self, other: Self) -> Self {
        Self {
            rays_cast: self.rays_cast + other.rays_cast,
            hits: self.hits + other.hits,
            elapsed: self.elapsed.max(other.elapsed),
        }
    }
}

/// Pixel ranges (end exclusive) a surface may cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSpan {
    /// Columns, left to right.
    pub cols: Range<usize>,
    /// Rows, bottom to top.
    pub rows: Range<usize>,
}

impl PixelSpan {
    /// Every pixel of a `width` x `height` buffer.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            cols: 0..width,
            rows: 0..height,
        }
    }

    /// Pixels whose centers may fall inside `rect`.
    ///
    /// Start indices round down and end indices round up, so the span never
    /// loses a pixel of the rectangle. `None` if the span is empty.
    pub fn from_rect(rect: &ScreenRect, width: usize, height: usize) -> Option<Self> {
        let cols = axis_range(rect.min.x, rect.max.x, width);
        let rows = axis_range(rect.min.y, rect.max.y, height);
        (!cols.is_empty() && !rows.is_empty()).then_some(Self { cols, rows })
    }

    /// Number of pixels in the span.
    pub fn area(&self) -> usize {
        self.cols.len() * self.rows.len()
    }
}

fn axis_range(min: f32, max: f32, dim: usize) -> Range<usize> {
    let to_pixel = |ndc: f32| (ndc + 1.0) * 0.5 * dim as f32;
    let start = to_pixel(min).floor().clamp(0.0, dim as f32) as usize;
    let end = to_pixel(max).ceil().clamp(0.0, dim as f32) as usize;
    start..end.max(start)
}

/// Normalized device coordinate of the center of pixel `index` along an axis of `dim` pixels.
pub fn pixel_center(index: usize, dim: usize) -> f32 {
    -1.0 + (2 * index + 1) as f32 / dim as f32
}

/// Everything a row worker reads; shared by reference between threads.
struct RowPass<'a> {
    camera: &'a Camera,
    materials: &'a MaterialTable,
    spans: Vec<(&'a Surface, PixelSpan)>,
    width: usize,
    height: usize,
    format: PixelFormat,
    progress: ProgressBar,
}

impl RowPass<'_> {
    fn render_row(&self, row: usize, bytes: &mut [u8]) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut depth = vec![f32::INFINITY; self.width];
        let visible = Interval::forward(self.camera.far());
        let bpp = self.format.bytes_per_pixel();
        let y = pixel_center(row, self.height);

        for (surface, span) in &self.spans {
            if !span.rows.contains(&row) {
                continue;
            }
            for col in span.cols.clone() {
                let ray = self.camera.view_ray(pixel_center(col, self.width), y);
                stats.rays_cast += 1;
                let Some(hit) = surface.hit(&ray, visible.up_to(depth[col])) else {
                    continue;
                };
                depth[col] = hit.t;
                stats.hits += 1;
                let color = self.materials.shade(&hit, &ray);
                self.format.write(&mut bytes[col * bpp..], color);
            }
        }

        self.progress.inc(1);
        stats
    }
}

/// Render target plus the loop that fills it.
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: PixelBuffer,
}

impl Canvas {
    /// Black RGB canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
        }
    }

    /// Black canvas with an explicit pixel layout.
    pub fn with_format(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            buffer: PixelBuffer::with_format(width, height, format),
        }
    }

    /// The frame of the last render.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Reset the frame to black.
    pub fn clear(&self) {
        self.buffer.clear();
    }

    /// Copy the frame into caller memory laid out like the buffer.
    pub fn resolve_to_bitmap(&self, dst: &mut [u8]) -> Result<()> {
        self.buffer.resolve_to_bitmap(dst)
    }

    /// Top-down RGB image of the frame.
    pub fn to_image(&self) -> RgbImage {
        self.buffer.to_image()
    }

    /// Clear the frame and render `surfaces` as seen by `camera`.
    pub fn render(
        &self,
        camera: &Camera,
        surfaces: &[Surface],
        materials: &MaterialTable,
        options: &RenderOptions,
    ) -> RenderStats {
        let start = Instant::now();
        let (width, height) = (self.width(), self.height());
        info!(
            "Rendering {}x{} frame with {} surfaces using {} threads...",
            width,
            height,
            surfaces.len(),
            if options.parallel {
                rayon::current_num_threads()
            } else {
                1
            }
        );

        let spans = surfaces
            .iter()
            .filter_map(|surface| {
                let span = if options.cull {
                    PixelSpan::from_rect(&surface.screen_bounds(camera)?, width, height)?
                } else {
                    PixelSpan::full(width, height)
                };
                debug!(
                    "{} covers columns {:?}, rows {:?} ({} pixels)",
                    surface.kind(),
                    span.cols,
                    span.rows,
                    span.area()
                );
                Some((surface, span))
            })
            .collect();

        let progress = if options.progress {
            let bar = ProgressBar::new(height as u64);
            if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} rows ETA: {eta}") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let pass = RowPass {
            camera,
            materials,
            spans,
            width,
            height,
            format: self.buffer.format(),
            progress,
        };

        let stride = self.buffer.stride();
        let mut data = self.buffer.write();
        data.fill(0);

        let mut stats = if options.parallel {
            data.par_chunks_mut(stride)
                .enumerate()
                .map(|(row, bytes)| pass.render_row(row, bytes))
                .reduce(RenderStats::default, RenderStats::merge)
        } else {
            data.chunks_mut(stride)
                .enumerate()
                .map(|(row, bytes)| pass.render_row(row, bytes))
                .fold(RenderStats::default(), RenderStats::merge)
        };
        drop(data);

        pass.progress.finish();
        stats.elapsed = start.elapsed();
        info!(
            "Frame rendered in {:.2?} ({} ray queries, {} hits)",
            stats.elapsed, stats.rays_cast, stats.hits
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::pixel_buffer::{Color, PixelColor};
    use crate::plane::Plane;
    use crate::sphere::Sphere;
    use glam::{Vec2, Vec3A};
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(FRAC_PI_2, 1.0, Vec3A::new(0.0, 0.0, -5.0))
    }

    fn sequential() -> RenderOptions {
        RenderOptions {
            parallel: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_span_rounds_outward() {
        let rect = ScreenRect {
            min: Vec2::new(-0.3, -1.5),
            max: Vec2::new(0.3, 0.05),
        };
        let span = PixelSpan::from_rect(&rect, 10, 10).unwrap();
        assert_eq!(span.cols, 3..7);
        assert_eq!(span.rows, 0..6);
        assert_eq!(span.area(), 24);
    }

    #[test]
    fn test_span_off_screen_is_none() {
        let rect = ScreenRect {
            min: Vec2::new(1.0, -1.0),
            max: Vec2::new(1.0, 1.0),
        };
        assert!(PixelSpan::from_rect(&rect, 10, 10).is_none());
    }

    #[test]
    fn test_pixel_centers() {
        assert!((pixel_center(0, 4) + 0.75).abs() < 1e-6);
        assert!((pixel_center(3, 4) - 0.75).abs() < 1e-6);
        assert!(pixel_center(1, 2) > 0.0);
    }

    #[test]
    fn test_sphere_in_center() {
        let mut materials = MaterialTable::new();
        let red = materials.add(Material::new("red", Color::new(1.0, 0.0, 0.0)));
        let surfaces = [Surface::from(Sphere::new(1.0, Vec3A::ZERO).with_material(red))];
        let canvas = Canvas::new(9, 9);

        let stats = canvas.render(&camera(), &surfaces, &materials, &sequential());
        assert_eq!(canvas.buffer().pixel(4, 4), Some(PixelColor::new(255, 0, 0)));
        assert_eq!(canvas.buffer().pixel(0, 0), Some(PixelColor::BLACK));
        assert!(stats.hits > 0);
        assert!(stats.rays_cast < 81, "culling should skip corners");
    }

    #[test]
    fn test_nearest_surface_wins_in_any_order() {
        let mut materials = MaterialTable::new();
        let near = materials.add(Material::new("near", Color::new(0.0, 1.0, 0.0)));
        let far = materials.add(Material::new("far", Color::new(0.0, 0.0, 1.0)));
        let front = Surface::from(Sphere::new(1.0, Vec3A::new(0.0, 0.0, -1.0)).with_material(near));
        let back = Surface::from(Sphere::new(2.0, Vec3A::new(0.0, 0.0, 2.0)).with_material(far));

        let a = Canvas::new(16, 16);
        a.render(&camera(), &[front.clone(), back.clone()], &materials, &sequential());
        let b = Canvas::new(16, 16);
        b.render(&camera(), &[back, front], &materials, &sequential());

        assert_eq!(a.buffer().snapshot(), b.buffer().snapshot());
        let center = a.buffer().pixel(8, 8).unwrap();
        assert_eq!(center, PixelColor::new(0, 255, 0));
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let materials = MaterialTable::new();
        let canvas = Canvas::new(4, 4);
        canvas.buffer().set_pixel(0.0, 0.0, PixelColor::new(9, 9, 9));
        canvas.render(&camera(), &[], &materials, &RenderOptions::default());
        assert!(canvas.buffer().snapshot().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_floor_fills_lower_half() {
        let materials = MaterialTable::new();
        let camera = Camera::new(FRAC_PI_2, 1.0, Vec3A::new(0.0, 1.0, 0.0));
        let surfaces = [Surface::from(Plane::new(0.0, Vec3A::Y))];
        let canvas = Canvas::new(8, 8);
        canvas.render(&camera, &surfaces, &materials, &RenderOptions::default());
        // Row 0 is the bottom of the frame
        assert_ne!(canvas.buffer().pixel(4, 0), Some(PixelColor::BLACK));
        assert_eq!(canvas.buffer().pixel(4, 7), Some(PixelColor::BLACK));
    }

    #[test]
    fn test_resolve_to_bitmap_checks_size() {
        let canvas = Canvas::new(3, 2);
        let mut exact = vec![1u8; canvas.buffer().byte_len()];
        canvas.resolve_to_bitmap(&mut exact).unwrap();
        assert!(exact.iter().all(|&b| b == 0));
        let mut short = vec![0u8; 4];
        assert!(canvas.resolve_to_bitmap(&mut short).is_err());
    }
}
