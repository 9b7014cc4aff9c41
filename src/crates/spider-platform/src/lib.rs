//! The architecture model: clusters of processing elements linked by
//! memory buses, plus the communication cost routines the mapper (§4.4)
//! consults when deciding whether a cross-cluster transfer is worth its
//! SEND/RECEIVE overhead.
//!
//! Grounded on `original_source/libspider/archi/*` and `api/archi-api.h`.

pub mod bus;
pub mod cluster;
pub mod pe;
pub mod platform;

pub use bus::{BusCostModel, InfiniteCost, InterClusterBus, LinearCost, MemoryBus, ZeroCost};
pub use cluster::{Cluster, ClusterIx};
pub use pe::{Pe, PeRole};
pub use platform::Platform;
