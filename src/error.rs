//! Error taxonomy shared by both decompositions and the tools.
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by loading, partitioning, filtering and collecting.
#[derive(Debug, Error)]
pub enum StencilError {
    /// Image file missing or undecodable. No output is written.
    #[error("failed to load image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Worker count incompatible with the image layout. Raised before any
    /// pixel is computed.
    #[error("partition error: {0}")]
    Partition(String),

    /// Width or height below 3: there are no interior pixels.
    #[error("image {width}x{height} has no interior pixels")]
    Dimension { width: usize, height: usize },

    #[error("buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A collective could not complete (peer gone, protocol mismatch).
    #[error("communication error: {0}")]
    Communication(String),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, StencilError>;
