#![doc = include_str!("../README.md")]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod message;
pub mod partition;
pub mod shared;
pub mod stencil;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{Result, StencilError};
pub use crate::image::PixelBuffer;
pub use crate::message::{filter_message_passing, MessagePassingOptions};
pub use crate::shared::filter_shared;
pub use crate::stencil::{GradientKernel, StencilFilter};
pub use crate::types::FilterOutput;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use sobel_stencil::prelude::*;
///
/// # fn main() -> sobel_stencil::Result<()> {
/// let img = PixelBuffer::filled(64, 48, [100, 100, 100, 255]);
/// let filter = StencilFilter::sobel();
///
/// let shared = filter_shared(&img, &filter, 4)?;
/// let ranks = filter_message_passing(&img, &filter, 4, MessagePassingOptions::default())?;
/// assert_eq!(shared.image, ranks.image);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageView, PixelBuffer};
    pub use crate::message::{filter_message_passing, MessagePassingOptions};
    pub use crate::shared::filter_shared;
    pub use crate::StencilFilter;
}
