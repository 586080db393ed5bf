//! # Output Module
//!
//! Writes rendered frames to disk. Frames are already 8-bit, so export is a
//! plain PNG encode of the top-down image produced by the canvas.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use log::{info, warn};

use lumaray::Result;

/// Save a frame as PNG.
///
/// The file is always PNG-encoded; a different extension only produces a warning.
///
/// # Errors
///
/// Returns [`lumaray::Error::Image`] when encoding or writing fails, e.g. for an
/// invalid path or insufficient permissions.
pub fn save_png(image: &RgbImage, output_path: &Path) -> Result<()> {
    let is_png = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if !is_png {
        warn!(
            "Output {} has no .png extension, writing PNG anyway",
            output_path.display()
        );
    }

    image.save_with_format(output_path, ImageFormat::Png)?;
    info!(
        "Image saved as {} ({}x{})",
        output_path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
