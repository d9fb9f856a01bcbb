use crate::error::Result;

/// Rank of the process that loads the input and receives the result.
pub const COORDINATOR: usize = 0;

/// Collective operations of a message-passing group.
///
/// Every collective blocks until all ranks of the group have entered it;
/// ranks share no memory and exchange owned byte buffers only. Rank
/// assignment and process creation belong to the runtime implementing this
/// trait.
pub trait Communicator {
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    #[inline]
    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// The coordinator passes `Some(payload)`, every other rank `None`; all
    /// ranks return the coordinator's payload.
    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>>;

    /// The coordinator passes one payload per rank in rank order; each rank
    /// returns its own.
    fn scatter(&self, payloads: Option<Vec<Vec<u8>>>) -> Result<Vec<u8>>;

    /// Every rank contributes `slice`; the coordinator returns all slices in
    /// rank order, the other ranks `None`.
    fn gather(&self, slice: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>>;
}
