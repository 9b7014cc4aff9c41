//! Vertex kinds.
//!
//! The original models each special vertex as its own `ExecVertex` subclass
//! (`original_source/.../SpecialVertex.h`: `ForkVertex`, `JoinVertex`,
//! `HeadVertex`, `TailVertex`, `RepeatVertex`, `DuplicateVertex`,
//! `InitVertex`, `EndVertex`, `ConfigVertex`, `DelayVertex`) dispatched
//! through a `Visitor`. This crate collapses that hierarchy to a single enum
//! matched on directly, since every one of those subclasses differs only in
//! `subtype()`/a couple of port-count invariants, not in behavior that
//! benefits from dynamic dispatch.

use crate::ids::GraphId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    /// A user actor, executed by a named kernel at runtime.
    Normal { kernel: String },
    /// A config actor: runs once per firing on the GRT, produces DYNAMIC
    /// parameter values, must end up with repetition value 1.
    Config { kernel: String },
    /// A subgraph instance; its body is a nested [`crate::graph::Graph`]
    /// tracked by [`GraphId`] in the owning graph's subgraph table.
    Hierarchical { body: GraphId },
    /// Graph-boundary input port, consumed as a source in the parent scope
    /// and as an interface vertex inside the subgraph.
    Input,
    /// Graph-boundary output port.
    Output,
    /// Virtual vertex standing in for a delay's initial tokens during BRV
    /// solving; repetition value must end up 1.
    Delay,
    /// Synthesized during single-rate expansion: splits one source firing's
    /// tokens across N sink firings.
    Fork,
    /// Synthesized during single-rate expansion: gathers N source firings'
    /// tokens into one sink firing.
    Join,
    /// Synthesized: keeps the first `count` tokens of its input.
    Head,
    /// Synthesized: keeps the last `count` tokens of its input.
    Tail,
    /// Synthesized: replays its input a fixed number of times.
    Repeat,
    /// Synthesized: broadcasts its input to every output.
    Duplicate,
    /// Synthesized: produces a self-loop delay's initial tokens.
    Init,
    /// Synthesized: consumes a self-loop delay's final tokens.
    End,
}

impl VertexKind {
    /// Special vertices that the BRV solver requires to end up with
    /// repetition value exactly 1 (`original_source/.../LCMBRVCompute.cpp`'s
    /// `checkValidity`, generalized to config actors per §4.1).
    pub fn requires_unit_repetition(&self) -> bool {
        matches!(self, VertexKind::Config { .. } | VertexKind::Delay)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, VertexKind::Input | VertexKind::Output)
    }

    pub fn is_hierarchical(&self) -> bool {
        matches!(self, VertexKind::Hierarchical { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            VertexKind::Normal { .. } => "normal",
            VertexKind::Config { .. } => "config",
            VertexKind::Hierarchical { .. } => "hierarchical",
            VertexKind::Input => "input",
            VertexKind::Output => "output",
            VertexKind::Delay => "delay",
            VertexKind::Fork => "fork",
            VertexKind::Join => "join",
            VertexKind::Head => "head",
            VertexKind::Tail => "tail",
            VertexKind::Repeat => "repeat",
            VertexKind::Duplicate => "duplicate",
            VertexKind::Init => "init",
            VertexKind::End => "end",
        }
    }
}
