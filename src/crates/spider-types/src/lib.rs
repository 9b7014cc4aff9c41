//! Shared primitives used across every Spider crate: error types, rational
//! arithmetic for the BRV solver, numeric ids, named arenas, and
//! startup/runtime configuration.

pub mod arena;
pub mod config;
pub mod error;
pub mod ids;
pub mod rational;

pub use arena::{Arenas, StackId};
pub use config::{AllocatorType, ExecutionPolicy, MappingPolicy, RuntimeConfig, RuntimeMode, SchedulingPolicy, StartupConfig};
pub use error::{Error, Result};
pub use ids::{EdgeId, GraphId, IdAllocator, ParamId, VertexId};
pub use rational::{lcm, Rational};
