//! Collector and Reconstructor: bring the filtered spans back to the
//! coordinator and reshape them into one image.
use super::comm::Communicator;
use crate::error::{Result, StencilError};
use crate::image::PixelBuffer;
use crate::partition::GatherPlan;
use log::debug;

pub struct Collector<'c, C: Communicator> {
    comm: &'c C,
    plan: &'c GatherPlan,
}

impl<'c, C: Communicator> Collector<'c, C> {
    pub fn new(comm: &'c C, plan: &'c GatherPlan) -> Self {
        Self { comm, plan }
    }

    /// Collective: send this rank's slice; the coordinator returns the whole
    /// byte stream in rank order.
    ///
    /// The slice length is checked against the plan on both ends.
    pub fn collect(&self, slice: Vec<u8>) -> Result<Option<Vec<u8>>> {
        let rank = self.comm.rank();
        let expected = self.plan.slice_len(rank);
        if slice.len() != expected {
            return Err(StencilError::Partition(format!(
                "rank {rank} produced {} bytes, the gather plan expects {expected}",
                slice.len()
            )));
        }
        let Some(slices) = self.comm.gather(slice)? else {
            return Ok(None);
        };
        let total = self.plan.layout().total_bytes();
        let mut stream = Vec::with_capacity(total);
        for (from, part) in slices.into_iter().enumerate() {
            let range = self.plan.slice_range(from);
            if part.len() != range.len() || stream.len() != range.start {
                return Err(StencilError::Communication(format!(
                    "slice from rank {from} has {} bytes, expected {:?}",
                    part.len(),
                    range
                )));
            }
            stream.extend_from_slice(&part);
        }
        debug!(
            "gathered {} bytes from {} ranks ({:?})",
            stream.len(),
            self.plan.workers(),
            self.plan.mode()
        );
        Ok(Some(stream))
    }
}

/// Pure reshape of the gathered byte stream.
pub struct Reconstructor;

impl Reconstructor {
    pub fn reconstruct(width: usize, height: usize, stream: Vec<u8>) -> Result<PixelBuffer> {
        PixelBuffer::from_raw(width, height, stream)
    }
}
