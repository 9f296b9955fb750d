//! Error type shared by the whole crate.

use std::path::PathBuf;

/// Everything that can go wrong while loading assets, building geometry or driving the GPU.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document (font or configuration) could not be decoded.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The font request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A glyph outline string could not be parsed.
    #[error("malformed outline for glyph {glyph:?}: {detail}")]
    Outline {
        /// The glyph whose outline is broken.
        glyph: char,
        /// What was wrong with it.
        detail: String,
    },

    /// A cap polygon could not be tessellated.
    #[error("tessellation failed: {0}")]
    Tessellation(String),

    /// The font worker went away without producing a result.
    #[error("font loader disconnected before completing")]
    LoaderDisconnected,

    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(String),

    /// No suitable GPU adapter or device was found.
    #[error("GPU initialization failed: {0}")]
    Gpu(String),

    /// The surface could not provide a frame.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl Error {
    /// Wraps an I/O error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
