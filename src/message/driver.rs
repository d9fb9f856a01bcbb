//! Per-rank pipeline of the message-passing decomposition.
//!
//! Order of collectives, identical on every rank:
//! 1. header broadcast (dimensions);
//! 2. pixel distribution (broadcast or halo scatter);
//! 3. local filtering of the rank's row range, no communication;
//! 4. gather of every rank's span on the coordinator.
//!
//! The gather plan is validated right after the header is shared, on every
//! rank, so an incompatible worker count stops the whole group before any
//! pixel moves.
use super::collect::{Collector, Reconstructor};
use super::comm::{Communicator, COORDINATOR};
use super::distribute::{DistributionMode, Distributor};
use super::local::LocalWorld;
use crate::diagnostics::{elapsed_ms, FilterReport, Stopwatch, Variant, WorkerReport};
use crate::error::{Result, StencilError};
use crate::image::{ImageView, PixelBuffer};
use crate::partition::{Axis, GatherMode, GatherPlan, RangePartitioner, RowLayout};
use crate::stencil::StencilFilter;
use crate::types::FilterOutput;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePassingOptions {
    pub distribution: DistributionMode,
    pub gather: GatherMode,
}

/// Outcome of [`run_rank`] on one rank.
#[derive(Clone, Debug)]
pub struct RankResult {
    pub worker: WorkerReport,
    /// Reassembled output; only the coordinator holds it.
    pub image: Option<PixelBuffer>,
}

fn plan_for(width: usize, height: usize, workers: usize, gather: GatherMode) -> Result<GatherPlan> {
    let partitioner = RangePartitioner::new(height, workers)?;
    GatherPlan::new(RowLayout::new(width, height), partitioner, gather)
}

/// Run the full pipeline on one rank. Only the coordinator passes `image`.
pub fn run_rank<C: Communicator>(
    comm: &C,
    filter: &StencilFilter,
    image: Option<&PixelBuffer>,
    options: MessagePassingOptions,
) -> Result<RankResult> {
    let start = Instant::now();
    let rank = comm.rank();
    let distributor = Distributor::new(comm, options.distribution);

    let header = distributor.share_header(image)?;
    let (width, height) = (header.width(), header.height());
    let plan = plan_for(width, height, comm.size(), options.gather)?;
    let partitioner = plan.partitioner();

    let window = distributor.distribute(header, image, &partitioner)?;

    let span = partitioner.span(rank);
    let range = partitioner.range(rank);
    let filter_start = Instant::now();
    let mut slice = window.copy_rows(span.iter());
    let pixels = filter.filter_rows(&window, range, &mut slice, span.start);
    let filter_ms = elapsed_ms(filter_start);
    debug!(
        "rank {rank}: rows {}..{} ({} pixels) in {filter_ms:.3} ms",
        range.start, range.end, pixels
    );
    drop(window);

    let stream = Collector::new(comm, &plan).collect(slice)?;
    let image = stream
        .map(|bytes| Reconstructor::reconstruct(width, height, bytes))
        .transpose()?;

    if comm.is_coordinator() {
        info!(
            "rank {rank}: elapsed {:.3} ms across {} ranks",
            elapsed_ms(start),
            comm.size()
        );
    }
    Ok(RankResult {
        worker: WorkerReport {
            worker: rank,
            axis: Axis::Rows,
            range,
            span,
            pixels,
            elapsed_ms: filter_ms,
        },
        image,
    })
}

/// Filter `image` with `workers` ranks of an in-process [`LocalWorld`].
///
/// The gather plan is checked before the ranks are started.
pub fn filter_message_passing(
    image: &PixelBuffer,
    filter: &StencilFilter,
    workers: usize,
    options: MessagePassingOptions,
) -> Result<FilterOutput> {
    let mut clock = Stopwatch::start();
    let (width, height) = image.dims();
    plan_for(width, height, workers, options.gather)?;
    if let Err(e) = image.require_interior() {
        warn!("{e}; output equals input");
    }
    debug!(
        "message passing: {width}x{height} over {workers} ranks ({:?}, {:?})",
        options.distribution, options.gather
    );

    let world = LocalWorld::new(workers)?;
    let mut results = world.run(|comm| {
        let own = comm.is_coordinator().then_some(image);
        run_rank(comm, filter, own, options)
    })?;
    clock.lap("ranks");

    let output = results
        .get_mut(COORDINATOR)
        .and_then(|r| r.image.take())
        .ok_or_else(|| {
            StencilError::Communication("coordinator returned no image".to_string())
        })?;

    for r in &results {
        clock.record(format!("rank {}", r.worker.worker), r.worker.elapsed_ms);
    }
    let report = FilterReport {
        variant: Variant::MessagePassing,
        width: output.width(),
        height: output.height(),
        workers,
        distribution: Some(options.distribution),
        gather: Some(options.gather),
        per_worker: results.into_iter().map(|r| r.worker).collect(),
        timings: clock.finish(),
    };
    info!("Duration [ms]: {:.3}", report.timings.total_ms);
    Ok(FilterOutput {
        image: output,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            if (x / 2 + y / 3) % 2 == 0 {
                [20, 90, 160, 255]
            } else {
                [230, 40, 10, 200]
            }
        })
    }

    #[test]
    fn matches_sequential_reference() {
        let _ = env_logger::builder().is_test(true).try_init();
        let input = checker(9, 11);
        let filter = StencilFilter::sobel();
        let reference = filter.apply(&input);
        for workers in [1, 2, 3, 4, 11, 13] {
            let out =
                filter_message_passing(&input, &filter, workers, MessagePassingOptions::default())
                    .unwrap();
            assert_eq!(out.image, reference, "workers={workers}");
            assert_eq!(out.report.per_worker.len(), workers);
            assert_eq!(out.report.pixels(), 7 * 9);
        }
    }

    #[test]
    fn halo_distribution_gives_identical_output() {
        let input = checker(6, 14);
        let filter = StencilFilter::sobel();
        let options = MessagePassingOptions {
            distribution: DistributionMode::Halo,
            gather: GatherMode::Spans,
        };
        for workers in [1, 2, 5, 20] {
            let out = filter_message_passing(&input, &filter, workers, options).unwrap();
            assert_eq!(out.image, filter.apply(&input), "workers={workers}");
        }
    }

    #[test]
    fn fixed_chunks_fail_before_any_rank_starts() {
        let input = checker(4, 10);
        let options = MessagePassingOptions {
            gather: GatherMode::FixedChunks,
            ..Default::default()
        };
        let err =
            filter_message_passing(&input, &StencilFilter::sobel(), 4, options).unwrap_err();
        assert!(matches!(err, StencilError::Partition(_)));
    }
}
