//! Error types for scene loading and image export.
//!
//! Geometry never produces errors: degenerate intersections are plain misses.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a scene or exporting a frame.
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Scene description could not be parsed.
    #[error("invalid scene description: {0}")]
    Config(#[from] toml::de::Error),

    /// Image codec failure (texture load or PNG export).
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// A surface references a material name that was never declared.
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    /// Camera id does not belong to the scene.
    #[error("unknown camera id {0}")]
    UnknownCamera(usize),

    /// Destination memory does not match the pixel buffer layout.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for lumaray operations.
pub type Result<T> = std::result::Result<T, Error>;
