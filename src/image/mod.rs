pub mod io;
pub mod rgba;
pub mod traits;
pub mod window;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

pub use self::rgba::PixelBuffer;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::window::RowWindow;
