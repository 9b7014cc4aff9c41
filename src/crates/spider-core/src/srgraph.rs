//! The single-rate graph: one vertex per firing, one edge per dataflow
//! dependency between firings, every edge's source rate equal to its sink
//! rate.
//!
//! Grounded on `original_source/libspider/graphs/srdag/` (the flattened
//! `SRDAGGraph`/`SRDAGVertex`/`SRDAGEdge` triad). This crate collapses the
//! original's `ExecVertex` subclass hierarchy for synthesized vertices into
//! one [`SrVertexKind`] enum, per the REDESIGN FLAG in the specification's
//! design notes.

use crate::ids::{SrEdgeId, SrVertexId};
use spider_expr::Expression;
use spider_pisdf::{DelayId, GraphId, VertexId};
use std::collections::HashMap;

/// Per-PE execution timing plus the set of PEs a firing may be mapped to.
/// `original_source/.../PE.h` pairs a hardware type with a timing
/// expression; `mappable` being `None` means "any PE accepts this", the
/// common case for synthesized Fork/Join/etc. vertices.
#[derive(Debug, Clone, Default)]
pub struct RuntimeInfo {
    timings: HashMap<u32, Expression>,
    mappable: Option<Vec<u32>>,
}

impl RuntimeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timing(mut self, hw_type: u32, expr: Expression) -> Self {
        self.timings.insert(hw_type, expr);
        self
    }

    pub fn restricted_to(mut self, hw_types: impl IntoIterator<Item = u32>) -> Self {
        self.mappable = Some(hw_types.into_iter().collect());
        self
    }

    pub fn accepts(&self, hw_type: u32) -> bool {
        self.mappable.as_ref().map(|set| set.contains(&hw_type)).unwrap_or(true)
    }

    /// Timing expression for `hw_type`, falling back to a constant `1` unit
    /// when the vertex declares no timing model (synthesized vertices are
    /// typically assumed to cost a small fixed overhead).
    pub fn timing(&self, hw_type: u32) -> Expression {
        self.timings.get(&hw_type).cloned().unwrap_or_else(|| Expression::from_value(1))
    }
}

/// Traces an SR-vertex back to the PiSDF vertex and firing index that
/// produced it, for diagnostics and for re-identifying delay-setter/getter
/// pairs after expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub graph: GraphId,
    pub vertex: VertexId,
    pub firing: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrVertexKind {
    /// One firing of a user actor.
    Normal { kernel: String },
    /// One firing of a config actor (repetition value is always 1, so at
    /// most one of these exists per originating PiSDF config vertex).
    Config { kernel: String },
    /// Splits one producer firing's tokens across several sink slices.
    Fork,
    /// Gathers several producer firings' tokens into one sink slice.
    Join,
    /// Keeps the first `count` tokens of its input, discards the rest.
    Head,
    /// Keeps the last `count` tokens of its input, discards the rest.
    Tail,
    /// Replays its single input to every output unchanged.
    Duplicate,
    /// Repeats/reshapes its input stream to match a differently-rated
    /// output (interface rate narrowing/broadcasting, §4.2 step 2/3).
    Repeat,
    /// Produces a self-loop delay's initial tokens.
    Init,
    /// Consumes a self-loop delay's final tokens.
    End,
    /// Inter-cluster send, paired with exactly one [`SrVertexKind::Receive`].
    Send,
    /// Inter-cluster receive, paired with exactly one [`SrVertexKind::Send`].
    Receive,
}

impl SrVertexKind {
    pub fn label(&self) -> &'static str {
        match self {
            SrVertexKind::Normal { .. } => "normal",
            SrVertexKind::Config { .. } => "config",
            SrVertexKind::Fork => "fork",
            SrVertexKind::Join => "join",
            SrVertexKind::Head => "head",
            SrVertexKind::Tail => "tail",
            SrVertexKind::Duplicate => "duplicate",
            SrVertexKind::Repeat => "repeat",
            SrVertexKind::Init => "init",
            SrVertexKind::End => "end",
            SrVertexKind::Send => "send",
            SrVertexKind::Receive => "receive",
        }
    }

    /// Config firings execute on the GRT and are the only kind whose output
    /// parameters the dispatcher waits on (§4.6 GRT iteration protocol
    /// step 3).
    pub fn is_config(&self) -> bool {
        matches!(self, SrVertexKind::Config { .. })
    }

}

#[derive(Debug, Clone, Default)]
pub struct SrPorts {
    slots: Vec<Option<SrEdgeId>>,
}

impl SrPorts {
    pub fn with_count(count: usize) -> Self {
        Self { slots: vec![None; count] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<SrEdgeId> {
        self.slots.get(ix).copied().flatten()
    }

    pub fn push(&mut self, edge: SrEdgeId) -> usize {
        self.slots.push(Some(edge));
        self.slots.len() - 1
    }

    /// Clears slot `ix` back to empty without shifting any other slot, so
    /// sibling port indices stay valid (they feed FIFO offsets and
    /// SEND/RECEIVE synthesis downstream).
    pub fn clear_slot(&mut self, ix: usize) {
        if let Some(slot) = self.slots.get_mut(ix) {
            *slot = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<SrEdgeId>> + '_ {
        self.slots.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub struct SrVertex {
    id: SrVertexId,
    name: String,
    kind: SrVertexKind,
    inputs: SrPorts,
    outputs: SrPorts,
    runtime_info: RuntimeInfo,
    origin: Option<Origin>,
}

impl SrVertex {
    pub fn new(id: SrVertexId, name: impl Into<String>, kind: SrVertexKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            inputs: SrPorts::default(),
            outputs: SrPorts::default(),
            runtime_info: RuntimeInfo::new(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_runtime_info(mut self, info: RuntimeInfo) -> Self {
        self.runtime_info = info;
        self
    }

    pub fn id(&self) -> SrVertexId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SrVertexKind {
        &self.kind
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn runtime_info(&self) -> &RuntimeInfo {
        &self.runtime_info
    }

    /// Rewrites this vertex's kind in place. Used by the optimizer's
    /// fork/duplicate normalization pass (§4.3), which needs to relabel a
    /// vertex without disturbing its id or already-wired ports.
    pub fn set_kind(&mut self, kind: SrVertexKind) {
        self.kind = kind;
    }

    pub fn inputs(&self) -> &SrPorts {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut SrPorts {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &SrPorts {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut SrPorts {
        &mut self.outputs
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SrEndpoint {
    pub vertex: SrVertexId,
    pub port: usize,
}

/// An edge of the single-rate graph. `rate` is the same non-negative
/// integer token count on both sides, per the post-expansion invariant in
/// §3 ("After SR expansion, every edge's source-rate equals its sink-rate").
#[derive(Debug, Clone)]
pub struct SrEdge {
    id: SrEdgeId,
    source: SrEndpoint,
    sink: SrEndpoint,
    rate: i64,
    /// Set when this edge is one side of a persistent delay's storage, so
    /// the FIFO allocator (§4.5) can route it to the persistent buffer
    /// instead of a fresh one.
    persistent_delay: Option<DelayId>,
}

impl SrEdge {
    pub fn new(id: SrEdgeId, source: SrEndpoint, sink: SrEndpoint, rate: i64) -> Self {
        Self {
            id,
            source,
            sink,
            rate,
            persistent_delay: None,
        }
    }

    pub fn with_persistent_delay(mut self, delay: DelayId) -> Self {
        self.persistent_delay = Some(delay);
        self
    }

    /// Same as [`Self::with_persistent_delay`] but through a `&mut`, for
    /// edges that are already wired by the time the delay's persistence is
    /// known (the expander connects an INIT/END vertex's edges through the
    /// generic [`crate::expansion::walk`] helper before it can tag them).
    pub fn set_persistent_delay(&mut self, delay: DelayId) {
        self.persistent_delay = Some(delay);
    }

    pub fn id(&self) -> SrEdgeId {
        self.id
    }

    pub fn source(&self) -> SrEndpoint {
        self.source
    }

    pub fn sink(&self) -> SrEndpoint {
        self.sink
    }

    pub fn rate(&self) -> i64 {
        self.rate
    }

    pub fn persistent_delay(&self) -> Option<DelayId> {
        self.persistent_delay
    }
}

/// Container for a fully expanded single-rate graph.
#[derive(Debug, Default)]
pub struct SrGraph {
    vertices: HashMap<SrVertexId, SrVertex>,
    edges: HashMap<SrEdgeId, SrEdge>,
    next_vertex: u32,
    next_edge: u32,
}

impl SrGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, name: impl Into<String>, kind: SrVertexKind) -> SrVertexId {
        let id = SrVertexId::new(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, SrVertex::new(id, name, kind));
        id
    }

    pub fn add_vertex_with(&mut self, build: impl FnOnce(SrVertexId) -> SrVertex) -> SrVertexId {
        let id = SrVertexId::new(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, build(id));
        id
    }

    pub fn vertex(&self, id: SrVertexId) -> Option<&SrVertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: SrVertexId) -> Option<&mut SrVertex> {
        self.vertices.get_mut(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &SrVertex> {
        self.vertices.values()
    }

    pub fn remove_vertex(&mut self, id: SrVertexId) -> Option<SrVertex> {
        self.vertices.remove(&id)
    }

    /// Connects `source`'s next free output port to `sink`'s next free
    /// input port and returns the new edge id.
    pub fn connect(&mut self, source: SrVertexId, sink: SrVertexId, rate: i64) -> SrEdgeId {
        let id = SrEdgeId::new(self.next_edge);
        self.next_edge += 1;
        let src_port = self.vertices.get_mut(&source).expect("source vertex exists").outputs_mut().push(id);
        let snk_port = self.vertices.get_mut(&sink).expect("sink vertex exists").inputs_mut().push(id);
        self.edges.insert(
            id,
            SrEdge::new(id, SrEndpoint { vertex: source, port: src_port }, SrEndpoint { vertex: sink, port: snk_port }, rate),
        );
        id
    }

    pub fn edge(&self, id: SrEdgeId) -> Option<&SrEdge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: SrEdgeId) -> Option<&mut SrEdge> {
        self.edges.get_mut(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &SrEdge> {
        self.edges.values()
    }

    /// Removes an edge and clears both of its incident port slots, so
    /// neither endpoint is left with a stale `Some(id)` pointing at a
    /// removed edge. Slots are cleared, not compacted: other port indices
    /// on the same vertex must stay stable.
    pub fn remove_edge(&mut self, id: SrEdgeId) -> Option<SrEdge> {
        let edge = self.edges.remove(&id)?;
        if let Some(source) = self.vertices.get_mut(&edge.source().vertex) {
            source.outputs_mut().clear_slot(edge.source().port);
        }
        if let Some(sink) = self.vertices.get_mut(&edge.sink().vertex) {
            sink.inputs_mut().clear_slot(edge.sink().port);
        }
        Some(edge)
    }

    pub fn predecessors(&self, id: SrVertexId) -> impl Iterator<Item = SrVertexId> + '_ {
        self.vertex(id)
            .into_iter()
            .flat_map(|v| v.inputs().iter())
            .flatten()
            .filter_map(move |e| self.edge(e).map(|e| e.source().vertex))
    }

    pub fn successors(&self, id: SrVertexId) -> impl Iterator<Item = SrVertexId> + '_ {
        self.vertex(id)
            .into_iter()
            .flat_map(|v| v.outputs().iter())
            .flatten()
            .filter_map(move |e| self.edge(e).map(|e| e.sink().vertex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_assigns_sequential_ports() {
        let mut g = SrGraph::new();
        let a = g.add_vertex("a", SrVertexKind::Normal { kernel: "a".into() });
        let b = g.add_vertex("b", SrVertexKind::Normal { kernel: "b".into() });
        let c = g.add_vertex("c", SrVertexKind::Normal { kernel: "c".into() });
        g.connect(a, b, 4);
        g.connect(a, c, 4);
        assert_eq!(g.vertex(a).unwrap().outputs().len(), 2);
    }

    #[test]
    fn successors_follow_output_edges() {
        let mut g = SrGraph::new();
        let a = g.add_vertex("a", SrVertexKind::Normal { kernel: "a".into() });
        let b = g.add_vertex("b", SrVertexKind::Normal { kernel: "b".into() });
        g.connect(a, b, 1);
        let succs: Vec<_> = g.successors(a).collect();
        assert_eq!(succs, vec![b]);
    }
}
