//! Message-passing decomposition: ranks share nothing and exchange owned
//! byte buffers through collectives.
//!
//! - [`Communicator`]: the collectives the pipeline needs (broadcast,
//!   scatter, gather) plus rank and group size.
//! - [`LocalWorld`]: an in-process runtime running each rank on its own
//!   thread, connected by channels.
//! - [`Distributor`], [`Collector`], [`Reconstructor`]: the three protocol
//!   steps around the filter.
//! - [`run_rank`] / [`filter_message_passing`]: the per-rank pipeline and a
//!   one-call driver.

pub mod collect;
pub mod comm;
pub mod distribute;
pub mod driver;
pub mod local;

pub use collect::{Collector, Reconstructor};
pub use comm::{Communicator, COORDINATOR};
pub use distribute::{halo_rows, DistributionMode, Distributor, ImageHeader};
pub use driver::{filter_message_passing, run_rank, MessagePassingOptions, RankResult};
pub use local::{LocalComm, LocalWorld};
