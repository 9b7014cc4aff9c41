//! FIFO allocator (§4.5): once the scheduler has fixed an execution order,
//! assigns every SR-graph edge (and every synthesized SEND/RECEIVE transfer)
//! a concrete buffer.
//!
//! Grounded on `original_source/.../scheduling/task/VertexTask.cpp`'s
//! `allocationRuleFor{Input,Output}Fifo` switch over vertex subtype — the
//! FORK/DUPLICATE/REPEAT aliasing rules below are a direct port of that
//! switch onto [`SrVertexKind`] — and `task/TaskSync.cpp`'s SEND/RECEIVE
//! rules (a SEND's output is a read-only alias of its own input; a RECEIVE's
//! output is always a fresh owned buffer).

use crate::ids::{FifoId, SrEdgeId, SrVertexId, TaskId};
use crate::scheduler::{Schedule, TaskKind};
use crate::srgraph::{SrGraph, SrVertexKind};
use spider_pisdf::DelayId;
use spider_types::error::{Error, Result};
use std::collections::HashMap;

/// Mirrors the specification's `RW_OWN`/`RW_ONLY`/`RW_EXT`/`RW_AUTO` vertex
/// attributes (§4.5, §9 Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoAttribute {
    /// A fresh buffer, exclusively owned by its producer until released.
    RwOwn,
    /// A read-only view onto another FIFO's buffer (FORK/DUPLICATE/REPEAT
    /// aliasing, or a SEND task reading straight out of its predecessor).
    RwOnly,
    /// A platform-registered external buffer, identified by index rather
    /// than allocated by this pass.
    RwExt,
    /// Resolved at allocation time per the open question recorded in
    /// `DESIGN.md`: aliases when the producer buffer fully covers the
    /// consumer's slice without overlap, otherwise behaves like `RwOwn`.
    RwAuto,
}

/// One allocated (or aliased) buffer.
#[derive(Debug, Clone)]
pub struct Fifo {
    id: FifoId,
    size: i64,
    attribute: FifoAttribute,
    virtual_address: u64,
    /// `Some(root)` when this FIFO is a view onto another FIFO's memory
    /// rather than an owner of its own, `offset` bytes into it.
    alias_of: Option<FifoId>,
    offset: u64,
}

impl Fifo {
    pub fn id(&self) -> FifoId {
        self.id
    }
    pub fn size(&self) -> i64 {
        self.size
    }
    pub fn attribute(&self) -> FifoAttribute {
        self.attribute
    }
    pub fn virtual_address(&self) -> u64 {
        self.virtual_address
    }
    pub fn alias_of(&self) -> Option<FifoId> {
        self.alias_of
    }
    pub fn offset(&self) -> u64 {
        self.offset
    }
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }
}

/// The committed allocation: a [`Fifo`] per SR-graph edge and per
/// synthesized transfer, persistent delay storage allocated once at
/// startup, and the schedule-ordered release points the dispatcher replays
/// to free memory as early as correctness allows.
#[derive(Debug, Default)]
pub struct FifoPlan {
    fifos: HashMap<FifoId, Fifo>,
    by_edge: HashMap<SrEdgeId, FifoId>,
    persistent: HashMap<DelayId, FifoId>,
    /// For each task, in dispatch order, the FIFOs whose last reader just
    /// finished and that may now be returned to the allocator (§4.5
    /// "Release policy": emitted after dispatch, never before).
    released_after: HashMap<TaskId, Vec<FifoId>>,
    next_id: u32,
    next_address: u64,
}

impl FifoPlan {
    pub fn fifo(&self, id: FifoId) -> Option<&Fifo> {
        self.fifos.get(&id)
    }

    pub fn fifo_for_edge(&self, edge: SrEdgeId) -> Option<&Fifo> {
        self.by_edge.get(&edge).and_then(|id| self.fifos.get(id))
    }

    pub fn persistent_buffer(&self, delay: DelayId) -> Option<&Fifo> {
        self.persistent.get(&delay).and_then(|id| self.fifos.get(id))
    }

    /// FIFO ids released immediately after `task` dispatches (possibly
    /// empty), for the dispatcher to turn into a release signal.
    pub fn released_ids_after(&self, task: TaskId) -> impl Iterator<Item = FifoId> + '_ {
        self.released_after.get(&task).into_iter().flatten().copied()
    }

    fn alloc(&mut self, size: i64, attribute: FifoAttribute) -> FifoId {
        let id = FifoId::new(self.next_id);
        self.next_id += 1;
        let address = self.next_address;
        self.next_address = self.next_address.saturating_add(size.max(0) as u64);
        self.fifos.insert(
            id,
            Fifo {
                id,
                size,
                attribute,
                virtual_address: address,
                alias_of: None,
                offset: 0,
            },
        );
        id
    }

    fn alias(&mut self, root: FifoId, offset: u64, size: i64, attribute: FifoAttribute) -> FifoId {
        let id = FifoId::new(self.next_id);
        self.next_id += 1;
        let base = self.fifos.get(&root).map(|f| f.virtual_address).unwrap_or(0);
        self.fifos.insert(
            id,
            Fifo {
                id,
                size,
                attribute,
                virtual_address: base + offset,
                alias_of: Some(root),
                offset,
            },
        );
        id
    }

    /// Resolves `id` to the buffer that actually owns the memory, following
    /// one level of aliasing (FORK/DUPLICATE/REPEAT/SEND never chain more
    /// than one alias deep by construction).
    fn root_of(&self, id: FifoId) -> FifoId {
        match self.fifos.get(&id).and_then(|f| f.alias_of) {
            Some(root) => root,
            None => id,
        }
    }
}

/// Runs the FIFO allocator over a committed [`Schedule`], in its dispatch
/// order so that every producer is visited before its consumers.
pub fn allocate_fifos(sr: &SrGraph, schedule: &Schedule) -> Result<FifoPlan> {
    let mut plan = FifoPlan::default();
    let mut reader_count: HashMap<FifoId, u32> = HashMap::new();

    for task in schedule.tasks_in_order() {
        match task.kind() {
            TaskKind::Vertex(vid) => allocate_vertex_outputs(sr, &mut plan, vid)?,
            TaskKind::Send { edge, rate } => {
                let source = plan
                    .by_edge
                    .get(&edge)
                    .copied()
                    .ok_or_else(|| Error::Validation(format!("fifo allocator: SEND has no source buffer for edge {}", edge.get())))?;
                // TaskSync.cpp: SEND's output fifo is SAME_IN, RW_ONLY --
                // a read-only alias of whatever it is forwarding, not a copy.
                let fifo = plan.alias(source, 0, rate, FifoAttribute::RwOnly);
                *reader_count.entry(plan.root_of(source)).or_insert(0) += 1;
                // A SEND does not retire `edge`'s buffer itself; the RECEIVE
                // on the far side becomes its new producer view.
                let _ = fifo;
            }
            TaskKind::Receive { edge, rate } => {
                // TaskSync.cpp: RECEIVE's output fifo is always NEW, RW_OWN.
                let fifo = plan.alloc(rate, FifoAttribute::RwOwn);
                plan.by_edge.insert(edge, fifo);
            }
        }
    }

    // Release pass: walk the same order again, decrementing the reader
    // count of every input buffer a task actually reads and recording a
    // release the moment a root buffer's count reaches zero. Kept as a
    // second pass so a buffer's total reader count (set while allocating
    // outputs above) is fully known before any decrement.
    let mut total_readers: HashMap<FifoId, u32> = HashMap::new();
    for edge in sr.edges() {
        if let Some(&fifo) = plan.by_edge.get(&edge.id()) {
            *total_readers.entry(plan.root_of(fifo)).or_insert(0) += 1;
        }
    }
    for (root, extra) in reader_count {
        *total_readers.entry(root).or_insert(0) += extra;
    }
    let mut remaining = total_readers;

    for task in schedule.tasks_in_order() {
        let mut released = Vec::new();
        for input_edge in input_edges_of(sr, task.kind()) {
            if let Some(&fifo) = plan.by_edge.get(&input_edge) {
                let root = plan.root_of(fifo);
                if let Some(count) = remaining.get_mut(&root) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        released.push(root);
                    }
                }
            }
        }
        if !released.is_empty() {
            plan.released_after.insert(task.id(), released);
        }
    }

    Ok(plan)
}

fn input_edges_of(sr: &SrGraph, kind: TaskKind) -> Vec<SrEdgeId> {
    match kind {
        TaskKind::Vertex(vid) => sr.vertex(vid).map(|v| v.inputs().iter().flatten().collect()).unwrap_or_default(),
        TaskKind::Send { edge, .. } => vec![edge],
        TaskKind::Receive { .. } => Vec::new(),
    }
}

/// Allocates every output FIFO of one SR-vertex, following the allocation
/// rule selected by its [`SrVertexKind`] (and, for FORK, its output index).
fn allocate_vertex_outputs(sr: &SrGraph, plan: &mut FifoPlan, vid: SrVertexId) -> Result<()> {
    let vertex = sr.vertex(vid).ok_or_else(|| Error::Validation(format!("fifo allocator: unknown SR-vertex {}", vid.get())))?;
    let outputs: Vec<SrEdgeId> = vertex.outputs().iter().flatten().collect();
    let inputs: Vec<SrEdgeId> = vertex.inputs().iter().flatten().collect();

    let input_fifo = |plan: &FifoPlan, ix: usize| -> Option<FifoId> { inputs.get(ix).and_then(|e| plan.by_edge.get(e).copied()) };

    match vertex.kind() {
        SrVertexKind::Fork => {
            let mut prev_offset = 0u64;
            for (ix, &edge_id) in outputs.iter().enumerate() {
                let rate = sr.edge(edge_id).map(|e| e.rate()).unwrap_or(0);
                let root = input_fifo(plan, 0).ok_or_else(|| Error::Validation(format!("fork vertex {} has no input buffer to alias", vid.get())))?;
                let fifo = plan.alias(root, prev_offset, rate, FifoAttribute::RwOnly);
                plan.by_edge.insert(edge_id, fifo);
                prev_offset += rate.max(0) as u64;
                let _ = ix;
            }
        }
        SrVertexKind::Duplicate => {
            let root = input_fifo(plan, 0).ok_or_else(|| Error::Validation(format!("duplicate vertex {} has no input buffer to alias", vid.get())))?;
            for &edge_id in &outputs {
                let rate = sr.edge(edge_id).map(|e| e.rate()).unwrap_or(0);
                let fifo = plan.alias(root, 0, rate, FifoAttribute::RwOnly);
                plan.by_edge.insert(edge_id, fifo);
            }
        }
        SrVertexKind::Repeat => {
            let out_edge = outputs.first().copied();
            let out_rate = out_edge.and_then(|e| sr.edge(e)).map(|e| e.rate()).unwrap_or(0);
            let in_rate = inputs.first().and_then(|e| sr.edge(*e)).map(|e| e.rate()).unwrap_or(-1);
            let fifo = if out_rate == in_rate {
                let root = input_fifo(plan, 0).ok_or_else(|| Error::Validation(format!("repeat vertex {} has no input buffer to alias", vid.get())))?;
                plan.alias(root, 0, out_rate, FifoAttribute::RwOnly)
            } else {
                plan.alloc(out_rate, FifoAttribute::RwOwn)
            };
            if let Some(edge_id) = out_edge {
                plan.by_edge.insert(edge_id, fifo);
            }
        }
        SrVertexKind::Init => {
            let out_edge = outputs.first().copied();
            let rate = out_edge.and_then(|e| sr.edge(e)).map(|e| e.rate()).unwrap_or(0);
            let persistent = out_edge.and_then(|e| sr.edge(e)).and_then(|e| e.persistent_delay());
            let fifo = match persistent {
                Some(delay) => match plan.persistent.get(&delay) {
                    Some(&id) => id,
                    None => {
                        let id = plan.alloc(rate, FifoAttribute::RwOwn);
                        plan.persistent.insert(delay, id);
                        id
                    }
                },
                None => plan.alloc(rate, FifoAttribute::RwOwn),
            };
            if let Some(edge_id) = out_edge {
                plan.by_edge.insert(edge_id, fifo);
            }
        }
        SrVertexKind::End => {
            // END writes into the persistent buffer when paired with one;
            // otherwise its write target is discarded once the write count
            // is reached (§4.5), so it needs no durable FIFO of its own.
            if let Some(edge_id) = inputs.first().copied() {
                if let Some(delay) = sr.edge(edge_id).and_then(|e| e.persistent_delay()) {
                    plan.persistent.entry(delay).or_insert_with(|| plan.alloc(sr.edge(edge_id).map(|e| e.rate()).unwrap_or(0), FifoAttribute::RwOwn));
                }
            }
        }
        SrVertexKind::Normal { .. } | SrVertexKind::Config { .. } | SrVertexKind::Join | SrVertexKind::Head | SrVertexKind::Tail => {
            for &edge_id in &outputs {
                let rate = sr.edge(edge_id).map(|e| e.rate()).unwrap_or(0);
                let fifo = plan.alloc(rate, FifoAttribute::RwOwn);
                plan.by_edge.insert(edge_id, fifo);
            }
        }
        SrVertexKind::Send | SrVertexKind::Receive => {
            // Never synthesized as their own SR-graph vertex in this
            // workspace: cross-cluster transfers are schedule-level `Task`s
            // (see `TaskKind::Send`/`TaskKind::Receive`), not SR-vertices.
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::schedule;
    use crate::srgraph::{RuntimeInfo, SrGraph, SrVertex};
    use spider_expr::Expression;
    use spider_platform::{Cluster, ClusterIx, Pe, PeRole, Platform};
    use spider_types::config::RuntimeConfig;

    fn platform(pe_count: usize) -> Platform {
        let mut platform = Platform::new();
        let mut cluster = Cluster::new(ClusterIx(0), "c0", 1 << 20);
        cluster.add_pe(Pe::new(0, 0, 0, "lrt", PeRole::Lrt));
        for i in 0..pe_count {
            cluster.add_pe(Pe::new(i + 1, 0, (i + 1) as u32, format!("pe{i}"), PeRole::Worker));
        }
        platform.add_cluster(cluster);
        platform
    }

    fn timed(id: crate::ids::SrVertexId, name: &str, kind: SrVertexKind) -> SrVertex {
        SrVertex::new(id, name, kind).with_runtime_info(RuntimeInfo::new().with_timing(0, Expression::from_value(1)))
    }

    #[test]
    fn normal_chain_allocates_fresh_owned_buffers() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| timed(id, "a", SrVertexKind::Normal { kernel: "a".into() }));
        let b = sr.add_vertex_with(|id| timed(id, "b", SrVertexKind::Normal { kernel: "b".into() }));
        let edge = sr.connect(a, b, 4);

        let platform = platform(1);
        let config = RuntimeConfig::default();
        let sched = schedule(&sr, &platform, &config).unwrap();
        let plan = allocate_fifos(&sr, &sched).unwrap();

        let fifo = plan.fifo_for_edge(edge).unwrap();
        assert_eq!(fifo.size(), 4);
        assert_eq!(fifo.attribute(), FifoAttribute::RwOwn);
        assert!(!fifo.is_alias());
    }

    #[test]
    fn fork_outputs_alias_the_source_buffer_at_increasing_offsets() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| timed(id, "a", SrVertexKind::Normal { kernel: "a".into() }));
        let fork = sr.add_vertex_with(|id| timed(id, "fork", SrVertexKind::Fork));
        let b = sr.add_vertex_with(|id| timed(id, "b", SrVertexKind::Normal { kernel: "b".into() }));
        let c = sr.add_vertex_with(|id| timed(id, "c", SrVertexKind::Normal { kernel: "c".into() }));
        sr.connect(a, fork, 8);
        let e0 = sr.connect(fork, b, 3);
        let e1 = sr.connect(fork, c, 5);

        let platform = platform(1);
        let config = RuntimeConfig::default();
        let sched = schedule(&sr, &platform, &config).unwrap();
        let plan = allocate_fifos(&sr, &sched).unwrap();

        let f0 = plan.fifo_for_edge(e0).unwrap();
        let f1 = plan.fifo_for_edge(e1).unwrap();
        assert!(f0.is_alias());
        assert!(f1.is_alias());
        assert_eq!(f0.attribute(), FifoAttribute::RwOnly);
        assert_eq!(f1.virtual_address(), f0.virtual_address() + 3);
    }

    #[test]
    fn duplicate_outputs_all_alias_the_same_input_offset() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| timed(id, "a", SrVertexKind::Normal { kernel: "a".into() }));
        let dup = sr.add_vertex_with(|id| timed(id, "dup", SrVertexKind::Duplicate));
        let b = sr.add_vertex_with(|id| timed(id, "b", SrVertexKind::Normal { kernel: "b".into() }));
        let c = sr.add_vertex_with(|id| timed(id, "c", SrVertexKind::Normal { kernel: "c".into() }));
        sr.connect(a, dup, 4);
        let e0 = sr.connect(dup, b, 4);
        let e1 = sr.connect(dup, c, 4);

        let platform = platform(1);
        let config = RuntimeConfig::default();
        let sched = schedule(&sr, &platform, &config).unwrap();
        let plan = allocate_fifos(&sr, &sched).unwrap();

        let f0 = plan.fifo_for_edge(e0).unwrap();
        let f1 = plan.fifo_for_edge(e1).unwrap();
        assert_eq!(f0.virtual_address(), f1.virtual_address());
    }

    #[test]
    fn cross_cluster_receive_gets_a_fresh_owned_buffer() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| timed(id, "a", SrVertexKind::Normal { kernel: "a".into() }));
        let b = sr.add_vertex_with(|id| timed(id, "b", SrVertexKind::Normal { kernel: "b".into() }));
        sr.connect(a, b, 4);

        let mut platform = Platform::new();
        let mut c0 = Cluster::new(ClusterIx(0), "c0", 1024);
        c0.add_pe(Pe::new(0, 0, 0, "lrt0", PeRole::Lrt));
        c0.add_pe(Pe::new(1, 0, 10, "pe0", PeRole::Worker));
        platform.add_cluster(c0);
        let mut c1 = Cluster::new(ClusterIx(1), "c1", 1024);
        c1.add_pe(Pe::new(0, 0, 0, "lrt1", PeRole::Lrt));
        c1.add_pe(Pe::new(1, 0, 20, "pe1", PeRole::Worker));
        platform.add_cluster(c1);
        platform.add_inter_cluster_bus(
            ClusterIx(0),
            ClusterIx(1),
            spider_platform::InterClusterBus {
                a_to_b: spider_platform::MemoryBus::uniform(spider_platform::ZeroCost),
                b_to_a: spider_platform::MemoryBus::uniform(spider_platform::ZeroCost),
            },
        );

        // Restrict `a` and `b` to disjoint hardware types so the mapper is
        // forced to place them on different clusters and a SEND/RECEIVE
        // pair gets synthesized.
        let mut sr2 = SrGraph::new();
        let a2 = sr2.add_vertex_with(|id| {
            SrVertex::new(id, "a", SrVertexKind::Normal { kernel: "a".into() })
                .with_runtime_info(RuntimeInfo::new().with_timing(10, Expression::from_value(1)).restricted_to([10]))
        });
        let b2 = sr2.add_vertex_with(|id| {
            SrVertex::new(id, "b", SrVertexKind::Normal { kernel: "b".into() })
                .with_runtime_info(RuntimeInfo::new().with_timing(20, Expression::from_value(1)).restricted_to([20]))
        });
        let edge2 = sr2.connect(a2, b2, 4);
        let _ = (sr, a, b);

        let config = RuntimeConfig::default();
        let sched = schedule(&sr2, &platform, &config).unwrap();
        let plan = allocate_fifos(&sr2, &sched).unwrap();

        let fifo = plan.fifo_for_edge(edge2).unwrap();
        assert_eq!(fifo.attribute(), FifoAttribute::RwOwn);
        assert!(!fifo.is_alias());
    }
}
