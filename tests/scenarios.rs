mod common;

use common::synthetic_image::{checkerboard_rgba, vertical_split, BLACK, WHITE};
use sobel_stencil::image::ImageView;
use sobel_stencil::message::{filter_message_passing, MessagePassingOptions};
use sobel_stencil::{filter_shared, PixelBuffer, StencilFilter};

fn all_variants(input: &PixelBuffer, workers: usize) -> Vec<PixelBuffer> {
    let filter = StencilFilter::sobel();
    vec![
        filter.apply(input),
        filter_shared(input, &filter, workers).unwrap().image,
        filter_message_passing(input, &filter, workers, MessagePassingOptions::default())
            .unwrap()
            .image,
    ]
}

#[test]
fn flat_grey_image_has_zero_interior_and_unchanged_border() {
    let grey = [100, 100, 100, 255];
    let input = PixelBuffer::filled(5, 5, grey);
    for out in all_variants(&input, 1) {
        for y in 0..5 {
            for x in 0..5 {
                let interior = (1..4).contains(&x) && (1..4).contains(&y);
                let expected = if interior { [0, 0, 0, 255] } else { grey };
                assert_eq!(out.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn flat_images_of_any_colour_give_zero_gradient() {
    for colour in [[0, 0, 0, 255], [255, 255, 255, 255], [12, 200, 77, 9]] {
        let input = PixelBuffer::filled(8, 6, colour);
        let out = StencilFilter::sobel().apply(&input);
        for y in 1..5 {
            for x in 1..7 {
                assert_eq!(out.pixel(x, y), [0, 0, 0, colour[3]]);
            }
        }
    }
}

#[test]
fn vertical_edge_saturates_at_255() {
    let input = vertical_split(5, 5, 2);
    for out in all_variants(&input, 2) {
        assert_eq!(out.pixel(2, 2), WHITE);
        assert_eq!(out.pixel(1, 2), WHITE);
        // A fully white neighbourhood has no gradient.
        assert_eq!(out.pixel(3, 2), BLACK);
    }
}

#[test]
fn channels_stay_in_range_on_hard_edges() {
    let input = checkerboard_rgba(31, 23, 3);
    let out = StencilFilter::sobel().apply(&input);
    let mut saturated = 0;
    for y in 1..22 {
        for x in 1..30 {
            let px = out.pixel(x, y);
            // u8 already bounds the value; the edge must still be strong.
            if px[..3] == [255, 255, 255] {
                saturated += 1;
            }
        }
    }
    assert!(saturated > 0, "expected clamped pixels along the cell edges");
}

#[test]
fn border_ring_is_copied_through() {
    let input = checkerboard_rgba(17, 12, 3);
    for out in all_variants(&input, 4) {
        for x in 0..17 {
            assert_eq!(out.pixel(x, 0), input.pixel(x, 0));
            assert_eq!(out.pixel(x, 11), input.pixel(x, 11));
        }
        for y in 0..12 {
            assert_eq!(out.pixel(0, y), input.pixel(0, y));
            assert_eq!(out.pixel(16, y), input.pixel(16, y));
        }
    }
}

#[test]
fn images_without_interior_are_returned_unchanged() {
    for (w, h) in [(0, 0), (1, 9), (9, 2), (2, 2)] {
        let input = checkerboard_rgba(w, h, 1);
        assert!(input.require_interior().is_err());
        for out in all_variants(&input, 3) {
            assert_eq!(out, input, "{w}x{h}");
        }
    }
}
