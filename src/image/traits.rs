use super::CHANNELS;

/// Read access to RGBA8 rows addressed in full-image coordinates.
///
/// Implementors may hold only part of the image (see [`super::RowWindow`]);
/// `row(y)` must then panic for rows outside the held range.
pub trait ImageView {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Bytes of row `y`, `width * 4` long.
    fn row(&self, y: usize) -> &[u8];

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        let row = self.row(y);
        let i = x * CHANNELS;
        [row[i], row[i + 1], row[i + 2], row[i + 3]]
    }

    #[inline]
    fn row_bytes(&self) -> usize {
        self.width() * CHANNELS
    }

    /// True when a full 3×3 neighbourhood exists for at least one pixel.
    #[inline]
    fn has_interior(&self) -> bool {
        self.width() >= 3 && self.height() >= 3
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [u8];

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, px: [u8; CHANNELS]) {
        let i = x * CHANNELS;
        self.row_mut(y)[i..i + CHANNELS].copy_from_slice(&px);
    }
}
