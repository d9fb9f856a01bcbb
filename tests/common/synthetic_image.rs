use sobel_stencil::PixelBuffer;

pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Generates a high-contrast checkerboard with square cells.
pub fn checkerboard_rgba(width: usize, height: usize, cell: usize) -> PixelBuffer {
    assert!(cell > 0, "cell size must be positive");
    PixelBuffer::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            [32, 32, 32, 255]
        } else {
            [220, 220, 220, 255]
        }
    })
}

/// Columns `< split_x` black, the rest white.
pub fn vertical_split(width: usize, height: usize, split_x: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, _| if x < split_x { BLACK } else { WHITE })
}

/// Deterministic pseudo-random colours (xorshift), alpha varying too.
pub fn noise_rgba(width: usize, height: usize, seed: u32) -> PixelBuffer {
    let mut state = seed.max(1);
    PixelBuffer::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state.to_le_bytes()
    })
}
