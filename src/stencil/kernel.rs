//! Gradient kernel pair and the per-pixel combine/clamp.
//!
//! - Kernels are indexed `[kx + 1][ky + 1]`, `kx` being the column offset
//!   and `ky` the row offset of the neighbour.
//! - Per channel the responses combine as `|gx| + |gy|` (L1 magnitude),
//!   clamped to `[0, 255]`.
use crate::image::{ImageView, CHANNELS};

pub type Kernel3 = [[i32; 3]; 3];

pub const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
pub const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Immutable 3×3 kernel pair applied to the R, G and B channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientKernel {
    pub gx: Kernel3,
    pub gy: Kernel3,
}

impl GradientKernel {
    pub const SOBEL: GradientKernel = GradientKernel::new(SOBEL_KERNEL_X, SOBEL_KERNEL_Y);

    pub const fn new(gx: Kernel3, gy: Kernel3) -> Self {
        Self { gx, gy }
    }

    /// Filtered value of pixel `(x, y)`; alpha is taken from the centre pixel.
    ///
    /// The caller guarantees `1 <= x < width - 1` and `1 <= y < height - 1`.
    #[inline]
    pub fn response<I: ImageView>(&self, input: &I, x: usize, y: usize) -> [u8; CHANNELS] {
        let mut sum_x = [0i32; 3];
        let mut sum_y = [0i32; 3];
        let rows = [input.row(y - 1), input.row(y), input.row(y + 1)];
        for kx in 0..3 {
            let base = (x + kx - 1) * CHANNELS;
            for (ky, row) in rows.iter().enumerate() {
                let wx = self.gx[kx][ky];
                let wy = self.gy[kx][ky];
                for c in 0..3 {
                    let v = row[base + c] as i32;
                    sum_x[c] += v * wx;
                    sum_y[c] += v * wy;
                }
            }
        }
        let alpha = rows[1][x * CHANNELS + 3];
        [
            combine(sum_x[0], sum_y[0]),
            combine(sum_x[1], sum_y[1]),
            combine(sum_x[2], sum_y[2]),
            alpha,
        ]
    }
}

impl Default for GradientKernel {
    fn default() -> Self {
        Self::SOBEL
    }
}

/// `|gx| + |gy|` clamped into a channel value.
#[inline]
pub fn combine(gx: i32, gy: i32) -> u8 {
    (gx.abs() + gy.abs()).clamp(0, 255) as u8
}
