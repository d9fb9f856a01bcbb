//! 3×3 gradient stencil over RGBA images.
//!
//! - [`GradientKernel`] holds the Gx/Gy pair (Sobel by default) and computes
//!   the clamped L1 gradient magnitude of one pixel per colour channel.
//! - [`StencilFilter`] runs the kernel over a row interval or a column band
//!   of the interior, reading from the input and writing into a separate
//!   output.
//!
//! The outermost ring of pixels has no full neighbourhood and is never
//! written.

pub mod filter;
pub mod kernel;

pub use filter::StencilFilter;
pub use kernel::{combine, GradientKernel, Kernel3, SOBEL_KERNEL_X, SOBEL_KERNEL_Y};
