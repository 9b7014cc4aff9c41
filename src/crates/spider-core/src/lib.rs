//! Single-rate expansion, graph optimization, static scheduling and FIFO
//! allocation: everything downstream of a resolved PiSDF graph and ahead of
//! actual execution.

pub mod expansion;
pub mod fifo;
pub mod ids;
pub mod optimizer;
pub mod scheduler;
pub mod srgraph;

pub use expansion::{expand, expand_config_only, walk, FlowSlice};
pub use fifo::{allocate_fifos, Fifo, FifoAttribute, FifoPlan};
pub use ids::{FifoId, SrEdgeId, SrVertexId, TaskId};
pub use optimizer::optimize;
pub use scheduler::{schedule, ExecConstraint, PeRef, PeStats, Schedule, Task, TaskKind, TaskState};
pub use srgraph::{Origin, RuntimeInfo, SrEdge, SrEndpoint, SrGraph, SrPorts, SrVertex, SrVertexKind};
