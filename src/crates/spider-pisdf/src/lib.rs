//! PiSDF graph data model and the Basic Repetition Vector solver.
//!
//! A graph owns its vertices, edges, delays and parameter scope
//! (`original_source/libspider/graphs/pisdf/PiSDFGraph.cpp`); [`brv::compute`]
//! fills in every vertex's repetition value before single-rate expansion
//! runs on top of it.

pub mod brv;
pub mod delay;
pub mod edge;
pub mod graph;
pub mod ids;
pub mod param;
pub mod repository;
pub mod vertex;

pub use delay::Delay;
pub use edge::{Edge, EdgeEndpoint};
pub use graph::Graph;
pub use ids::{DelayId, EdgeId, GraphId, ParamId, VertexId};
pub use param::{Param, ParamKind, ParamScope};
pub use repository::GraphRepository;
pub use vertex::{Vertex, VertexKind};
