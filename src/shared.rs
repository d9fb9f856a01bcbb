//! Shared-memory decomposition: one input, one output, columns split across
//! the tasks of a thread pool.
//!
//! The output starts as a copy of the input. Every interior row of it is cut
//! at the column span boundaries of a [`RangePartitioner`] over
//! [`Axis::Columns`], and task `i` receives the `i`-th segment of every row.
//! The segments are disjoint `&mut` slices, so tasks write without locks and
//! the borrow checker rules out overlapping column ranges. Neighbours are
//! read from the shared, immutable input. Border rows are never handed out.
//!
//! With the `parallel` feature the tasks run in one fork-join region on a
//! rayon pool of `workers` threads; without it they run one after another.
use crate::diagnostics::{elapsed_ms, FilterReport, Stopwatch, Variant, WorkerReport};
use crate::error::Result;
#[cfg(feature = "parallel")]
use crate::error::StencilError;
use crate::image::{ImageView, PixelBuffer, CHANNELS};
use crate::partition::{Axis, RangePartitioner};
use crate::stencil::StencilFilter;
use crate::types::FilterOutput;
use log::{debug, info, warn};
use std::time::Instant;

/// Column band `i` of `out`: one mutable segment per interior row.
fn column_bands<'a>(
    out: &'a mut PixelBuffer,
    partitioner: &RangePartitioner,
) -> Vec<Vec<&'a mut [u8]>> {
    let interior_rows = out.height().saturating_sub(2);
    let rb = out.row_bytes();
    let mut bands: Vec<Vec<&mut [u8]>> = (0..partitioner.workers())
        .map(|_| Vec::with_capacity(interior_rows))
        .collect();
    if rb == 0 {
        return bands;
    }
    for row in out
        .as_bytes_mut()
        .chunks_exact_mut(rb)
        .skip(1)
        .take(interior_rows)
    {
        let mut rest = row;
        for (band, span) in bands.iter_mut().zip(partitioner.spans()) {
            let (segment, tail) = std::mem::take(&mut rest).split_at_mut(span.len() * CHANNELS);
            band.push(segment);
            rest = tail;
        }
    }
    bands
}

fn run_band(
    input: &PixelBuffer,
    filter: &StencilFilter,
    partitioner: &RangePartitioner,
    worker: usize,
    mut band: Vec<&mut [u8]>,
) -> WorkerReport {
    let start = Instant::now();
    let span = partitioner.span(worker);
    let range = partitioner.range(worker);
    let pixels = filter.filter_column_band(input, range, &mut band, span.start);
    WorkerReport {
        worker,
        axis: Axis::Columns,
        range,
        span,
        pixels,
        elapsed_ms: elapsed_ms(start),
    }
}

#[cfg(feature = "parallel")]
fn run_bands(
    input: &PixelBuffer,
    filter: &StencilFilter,
    partitioner: &RangePartitioner,
    bands: Vec<Vec<&mut [u8]>>,
) -> Result<Vec<WorkerReport>> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(partitioner.workers())
        .thread_name(|i| format!("stencil-{i}"))
        .build()
        .map_err(|e| StencilError::ThreadPool(e.to_string()))?;
    Ok(pool.install(|| {
        bands
            .into_par_iter()
            .enumerate()
            .map(|(worker, band)| run_band(input, filter, partitioner, worker, band))
            .collect()
    }))
}

#[cfg(not(feature = "parallel"))]
fn run_bands(
    input: &PixelBuffer,
    filter: &StencilFilter,
    partitioner: &RangePartitioner,
    bands: Vec<Vec<&mut [u8]>>,
) -> Result<Vec<WorkerReport>> {
    Ok(bands
        .into_iter()
        .enumerate()
        .map(|(worker, band)| run_band(input, filter, partitioner, worker, band))
        .collect())
}

/// Filter `input` with `workers` column tasks sharing one output buffer.
pub fn filter_shared(
    input: &PixelBuffer,
    filter: &StencilFilter,
    workers: usize,
) -> Result<FilterOutput> {
    let mut clock = Stopwatch::start();
    let (width, height) = input.dims();
    let partitioner = RangePartitioner::for_axis(Axis::Columns, width, height, workers)?;
    if let Err(e) = input.require_interior() {
        warn!("{e}; output equals input");
    }
    debug!("shared memory: {width}x{height} over {workers} column tasks");

    let mut output = input.clone();
    clock.lap("copy input");
    let per_worker = {
        let bands = column_bands(&mut output, &partitioner);
        run_bands(input, filter, &partitioner, bands)?
    };
    clock.lap("filter");
    let timings = clock.finish();
    info!("Duration [ms]: {:.3}", timings.total_ms);

    Ok(FilterOutput {
        image: output,
        report: FilterReport {
            variant: Variant::SharedMemory,
            width,
            height,
            workers,
            distribution: None,
            gather: None,
            per_worker,
            timings,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_interior_rows_by_span() {
        let mut img = PixelBuffer::new(10, 5);
        let p = RangePartitioner::new(10, 3).unwrap();
        let bands = column_bands(&mut img, &p);
        assert_eq!(bands.len(), 3);
        let widths: Vec<usize> = bands.iter().map(|b| b[0].len() / CHANNELS).collect();
        assert_eq!(widths, vec![3, 3, 4]);
        assert!(bands.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn matches_sequential_reference() {
        let input = PixelBuffer::from_fn(13, 6, |x, y| {
            [(x * 19) as u8, (y * 40) as u8, ((x + y) * 9) as u8, 255]
        });
        let filter = StencilFilter::sobel();
        let reference = filter.apply(&input);
        for workers in [1, 2, 4, 13, 17] {
            let out = filter_shared(&input, &filter, workers).unwrap();
            assert_eq!(out.image, reference, "workers={workers}");
            assert_eq!(out.report.pixels(), 11 * 4);
        }
    }

    #[test]
    fn zero_workers_is_a_partition_error() {
        let input = PixelBuffer::new(4, 4);
        assert!(filter_shared(&input, &StencilFilter::sobel(), 0).is_err());
    }
}
