//! Single-rate expansion: turns one PiSDF graph (plus its resolved
//! parameters) into a flat [`SrGraph`] of firings, synthesizing
//! FORK/JOIN/INIT/END vertices where producer and consumer slices don't
//! align 1:1.
//!
//! Grounded on `original_source/.../transformation/srdag/Transformation.cpp`
//! and the `SrcTransfoVectorVisitor.h`/`SnkTransfoVectorVisitor.h` pair: per
//! edge, build a producer-side slice vector and a consumer-side slice
//! vector, then walk them in lockstep. This crate unifies both visitors into
//! one [`walk`] helper operating on plain [`FlowSlice`] lists, since by the
//! time an edge is processed both its producer and consumer sides have
//! already been reduced to "a list of SR vertices ready to emit/accept N
//! tokens each" — whether that list came from a vertex's own firings, an
//! enclosing graph's parameter-resolved interface supply, or a subgraph's
//! already-expanded output interface.
//!
//! **Simplification** (recorded in `DESIGN.md`): a [`VertexKind::Hierarchical`]
//! vertex is required to have repetition value 1. PiSDF graphs in practice
//! use a hierarchical vertex with an explicit `Repeat`/replication wrapper
//! rather than firing a whole subgraph N times per enclosing firing; lifting
//! that restriction would require per-firing sub-slicing of interface flows
//! and is out of scope for the budget here.

use crate::srgraph::{Origin, SrGraph, SrVertex, SrVertexKind};
use crate::ids::SrVertexId;
use spider_pisdf::{brv, DelayId, EdgeEndpoint, Graph, GraphId, GraphRepository, ParamScope, Vertex, VertexId, VertexKind};
use spider_types::error::{Error, Result};
use std::collections::{HashMap, VecDeque};

/// A producer or consumer ready to move `rate` tokens through one more SR
/// edge, once [`walk`] or a caller connects it.
#[derive(Debug, Clone, Copy)]
pub struct FlowSlice {
    pub rate: i64,
    pub vertex: SrVertexId,
}

struct VertexSnap {
    id: VertexId,
    name: String,
    kind: VertexKind,
    repetition: u32,
}

struct EdgeSnap {
    id: spider_pisdf::EdgeId,
    source: EdgeEndpoint,
    sink: EdgeEndpoint,
    source_rate: i64,
    sink_rate: i64,
    delay: Option<DelaySnap>,
}

struct DelaySnap {
    id: DelayId,
    size: i64,
    setter: Option<EdgeEndpoint>,
    getter: Option<EdgeEndpoint>,
    persistent: bool,
}

fn snapshot(graph: &Graph, params: &ParamScope) -> Result<(Vec<VertexSnap>, Vec<EdgeSnap>)> {
    let vertices = graph
        .vertices()
        .map(|v: &Vertex| VertexSnap {
            id: v.id(),
            name: v.name().to_string(),
            kind: v.kind().clone(),
            repetition: v.repetition_value().unwrap_or(1),
        })
        .collect();

    let mut edges = Vec::new();
    for e in graph.edges() {
        let source_rate = e.source_rate(params)?;
        let sink_rate = e.sink_rate(params)?;
        let delay = match e.delay() {
            Some(delay_id) => {
                let delay = graph
                    .delay(delay_id)
                    .ok_or_else(|| Error::Validation(format!("edge references unknown delay {delay_id}")))?;
                Some(DelaySnap {
                    id: delay_id,
                    size: delay.size(params)?,
                    setter: delay.setter(),
                    getter: delay.getter(),
                    persistent: delay.is_persistent(),
                })
            }
            None => None,
        };
        edges.push(EdgeSnap {
            id: e.id(),
            source: e.source(),
            sink: e.sink(),
            source_rate,
            sink_rate,
            delay,
        });
    }
    Ok((vertices, edges))
}

/// Expands the repository's root graph into a complete [`SrGraph`].
pub fn expand(repo: &mut GraphRepository) -> Result<SrGraph> {
    let mut sr = SrGraph::new();
    let root = repo.root()?;
    expand_graph(repo, root, &HashMap::new(), &mut sr)?;
    Ok(sr)
}

/// Expands only the config-actor firings of the root graph, with no edges
/// wired between them. Used by the dispatcher's init phase (§4.2 step 7 /
/// §4.6 GRT protocol step 3): these run first, and their `JOB_SENT_PARAM`
/// feedback is applied to the graph's parameters before [`expand`] runs for
/// the full iteration.
pub fn expand_config_only(repo: &mut GraphRepository) -> Result<SrGraph> {
    let root = repo.root()?;
    let params = repo.get(root).ok_or_else(|| Error::Validation("no root graph".to_string()))?.params().clone();
    let graph = repo.get_mut(root).ok_or_else(|| Error::Validation("no root graph".to_string()))?;
    brv::compute(graph, &params)?;

    let (vertices, _edges) = snapshot(graph, &params)?;
    let mut sr = SrGraph::new();
    for v in vertices.iter().filter(|v| matches!(v.kind, VertexKind::Config { .. })) {
        let VertexKind::Config { kernel } = &v.kind else { unreachable!() };
        for f in 0..v.repetition {
            sr.add_vertex_with(|id| {
                SrVertex::new(id, format!("{}_{f}", v.name), SrVertexKind::Config { kernel: kernel.clone() })
                    .with_origin(Origin { graph: root, vertex: v.id, firing: f })
            });
        }
    }
    Ok(sr)
}

fn expand_graph(
    repo: &mut GraphRepository,
    graph_id: GraphId,
    external_inputs: &HashMap<VertexId, VecDeque<FlowSlice>>,
    sr: &mut SrGraph,
) -> Result<HashMap<VertexId, VecDeque<FlowSlice>>> {
    expand_graph_with_parent(repo, graph_id, None, external_inputs, sr)
}

fn expand_graph_with_parent(
    repo: &mut GraphRepository,
    graph_id: GraphId,
    parent_params: Option<&ParamScope>,
    external_inputs: &HashMap<VertexId, VecDeque<FlowSlice>>,
    sr: &mut SrGraph,
) -> Result<HashMap<VertexId, VecDeque<FlowSlice>>> {
    if let Some(parent_params) = parent_params {
        let graph = repo.get_mut(graph_id).ok_or_else(|| Error::Validation(format!("unknown subgraph {graph_id}")))?;
        graph.params_mut().resolve_inherited_from(parent_params)?;
    }
    let params = repo
        .get(graph_id)
        .ok_or_else(|| Error::Validation(format!("unknown subgraph {graph_id}")))?
        .params()
        .clone();
    let graph = repo.get_mut(graph_id).ok_or_else(|| Error::Validation(format!("unknown subgraph {graph_id}")))?;
    brv::compute(graph, &params)?;
    let (vertices, edges) = snapshot(graph, &params)?;
    let graph_name = graph.name().to_string();

    let mut firing_srs: HashMap<(VertexId, u32), SrVertexId> = HashMap::new();
    for v in &vertices {
        match &v.kind {
            VertexKind::Normal { kernel } => {
                for f in 0..v.repetition {
                    let id = sr.add_vertex_with(|id| {
                        SrVertex::new(id, format!("{graph_name}.{}_{f}", v.name), SrVertexKind::Normal { kernel: kernel.clone() })
                            .with_origin(Origin { graph: graph_id, vertex: v.id, firing: f })
                    });
                    firing_srs.insert((v.id, f), id);
                }
            }
            VertexKind::Config { kernel } => {
                for f in 0..v.repetition {
                    let id = sr.add_vertex_with(|id| {
                        SrVertex::new(id, format!("{graph_name}.{}_{f}", v.name), SrVertexKind::Config { kernel: kernel.clone() })
                            .with_origin(Origin { graph: graph_id, vertex: v.id, firing: f })
                    });
                    firing_srs.insert((v.id, f), id);
                }
            }
            VertexKind::Hierarchical { .. } if v.repetition != 1 => {
                return Err(Error::Validation(format!(
                    "hierarchical vertex '{}' has repetition {} (only 1 is supported by this expander)",
                    v.name, v.repetition
                )));
            }
            _ => {}
        }
    }

    // Recurse into every hierarchical vertex, in ascending vertex-id order
    // (the construction-time order is expected to be topological with
    // respect to direct hierarchical-to-hierarchical edges; see DESIGN.md).
    let mut hier: Vec<&VertexSnap> = vertices.iter().filter(|v| v.kind.is_hierarchical()).collect();
    hier.sort_by_key(|v| v.id.get());

    let mut hier_outputs: HashMap<VertexId, HashMap<usize, VecDeque<FlowSlice>>> = HashMap::new();
    for h in &hier {
        let VertexKind::Hierarchical { body } = h.kind else { unreachable!() };
        let input_iface_count = repo
            .get(body)
            .ok_or_else(|| Error::Validation(format!("hierarchical vertex '{}' points at unknown subgraph", h.name)))?
            .input_interfaces()
            .len();

        let mut sub_external: HashMap<VertexId, VecDeque<FlowSlice>> = HashMap::new();
        for p in 0..input_iface_count {
            if let Some(e) = edges.iter().find(|e| e.sink.vertex == h.id && e.sink.port == p) {
                let src_vec = source_vector(e.source, &vertices, &firing_srs, external_inputs, &hier_outputs, e.source_rate)?;
                let iface_id = repo.get(body).unwrap().input_interfaces()[p];
                sub_external.insert(iface_id, src_vec);
            }
        }

        let sub_outputs = expand_graph_with_parent(repo, body, Some(&params), &sub_external, sr)?;
        let output_iface_order = repo.get(body).unwrap().output_interfaces().to_vec();
        let by_port: HashMap<usize, VecDeque<FlowSlice>> = output_iface_order
            .iter()
            .enumerate()
            .filter_map(|(p, iface_id)| sub_outputs.get(iface_id).cloned().map(|v| (p, v)))
            .collect();
        hier_outputs.insert(h.id, by_port);
    }

    // Export this graph's own output interfaces to the caller.
    let mut exported: HashMap<VertexId, VecDeque<FlowSlice>> = HashMap::new();
    for (p, &iface_id) in graph_outputs(&vertices).iter().enumerate() {
        let mut combined: VecDeque<FlowSlice> = VecDeque::new();
        for e in edges.iter().filter(|e| e.sink.vertex == iface_id) {
            let _ = p;
            let src_vec = source_vector(e.source, &vertices, &firing_srs, external_inputs, &hier_outputs, e.source_rate)?;
            combined.extend(src_vec);
        }
        let flow = if combined.len() > 1 {
            let total: i64 = combined.iter().map(|s| s.rate).sum();
            let join = sr.add_vertex(format!("{graph_name}.export_join_{p}"), SrVertexKind::Join);
            for s in &combined {
                sr.connect(s.vertex, join, s.rate);
            }
            VecDeque::from([FlowSlice { rate: total, vertex: join }])
        } else {
            combined
        };
        exported.insert(iface_id, flow);
    }

    let hier_ids: Vec<VertexId> = hier.iter().map(|v| v.id).collect();
    let output_iface_ids = graph_outputs(&vertices);

    for e in &edges {
        if hier_ids.contains(&e.sink.vertex) || output_iface_ids.contains(&e.sink.vertex) {
            continue;
        }
        let sink_vertex = vertices
            .iter()
            .find(|v| v.id == e.sink.vertex)
            .ok_or_else(|| Error::Validation(format!("edge {} sinks at unknown vertex", e.id)))?;
        if matches!(sink_vertex.kind, VertexKind::Input) {
            // An input interface is never a consumer within its own graph.
            continue;
        }

        let src_vec = source_vector(e.source, &vertices, &firing_srs, external_inputs, &hier_outputs, e.source_rate)?;
        let snk_vec = sink_vector(e.sink, sink_vertex, &firing_srs, e.sink_rate)?;
        let label = format!("{graph_name}.e{}", e.id);

        if let Some(delay) = &e.delay {
            let self_loop = e.source.vertex == e.sink.vertex;
            if self_loop && delay.size < e.sink_rate {
                return Err(Error::InsufficientDelay {
                    vertex: sink_vertex.name.clone(),
                    delay_size: delay.size,
                    required: e.sink_rate,
                });
            }
            expand_delay_edge(sr, &label, src_vec, snk_vec, delay, &vertices, &firing_srs, external_inputs, &hier_outputs)?;
        } else {
            walk(sr, &label, src_vec, snk_vec)?;
        }
    }

    Ok(exported)
}

fn graph_outputs(vertices: &[VertexSnap]) -> Vec<VertexId> {
    vertices.iter().filter(|v| matches!(v.kind, VertexKind::Output)).map(|v| v.id).collect()
}

fn source_vector(
    ep: EdgeEndpoint,
    vertices: &[VertexSnap],
    firing_srs: &HashMap<(VertexId, u32), SrVertexId>,
    external_inputs: &HashMap<VertexId, VecDeque<FlowSlice>>,
    hier_outputs: &HashMap<VertexId, HashMap<usize, VecDeque<FlowSlice>>>,
    rate: i64,
) -> Result<VecDeque<FlowSlice>> {
    let v = vertices
        .iter()
        .find(|v| v.id == ep.vertex)
        .ok_or_else(|| Error::Validation(format!("unknown source vertex {}", ep.vertex)))?;
    match &v.kind {
        VertexKind::Normal { .. } | VertexKind::Config { .. } => {
            if rate == 0 {
                return Ok(VecDeque::new());
            }
            Ok((0..v.repetition)
                .map(|f| FlowSlice {
                    rate,
                    vertex: *firing_srs.get(&(v.id, f)).expect("firing SR vertex created for every repetition"),
                })
                .collect())
        }
        VertexKind::Input => Ok(external_inputs.get(&v.id).cloned().unwrap_or_default()),
        VertexKind::Hierarchical { .. } => Ok(hier_outputs.get(&v.id).and_then(|m| m.get(&ep.port)).cloned().unwrap_or_default()),
        other => Err(Error::Validation(format!("vertex '{}' of kind {} cannot be an edge source", v.name, other.label()))),
    }
}

fn sink_vector(ep: EdgeEndpoint, vertex: &VertexSnap, firing_srs: &HashMap<(VertexId, u32), SrVertexId>, rate: i64) -> Result<VecDeque<FlowSlice>> {
    match &vertex.kind {
        VertexKind::Normal { .. } | VertexKind::Config { .. } => {
            if rate == 0 {
                return Ok(VecDeque::new());
            }
            Ok((0..vertex.repetition)
                .map(|f| FlowSlice {
                    rate,
                    vertex: *firing_srs.get(&(vertex.id, f)).expect("firing SR vertex created for every repetition"),
                })
                .collect())
        }
        other => Err(Error::Validation(format!("vertex '{}' of kind {} cannot be an edge sink here", vertex.name, other.label()))),
    }
}

/// The lockstep walk of §4.2 steps 2-4, generalized: join every producer
/// slice down to one flow when there is more than one, fork that flow back
/// out to every consumer slice when there is more than one. A 1-producer /
/// 1-consumer edge degenerates to a direct connection; a true many-to-many
/// edge gets a join feeding a fork (semantically equivalent to the
/// original's single interleaved walk, at the cost of two extra nodes the
/// optimizer's fork/join passes may later simplify around).
pub fn walk(sr: &mut SrGraph, label: &str, source: VecDeque<FlowSlice>, sink: VecDeque<FlowSlice>) -> Result<()> {
    let total_src: i64 = source.iter().map(|s| s.rate).sum();
    let total_snk: i64 = sink.iter().map(|s| s.rate).sum();
    if total_src != total_snk {
        return Err(Error::Validation(format!("{label}: flow mismatch, {total_src} produced vs {total_snk} consumed")));
    }
    if total_src == 0 {
        tracing::debug!(edge = label, "zero-rate edge produces no SR-edges");
        return Ok(());
    }

    let producer = if source.len() == 1 {
        source[0].vertex
    } else {
        let join = sr.add_vertex(format!("join_{label}"), SrVertexKind::Join);
        for s in &source {
            sr.connect(s.vertex, join, s.rate);
        }
        join
    };

    if sink.len() == 1 {
        sr.connect(producer, sink[0].vertex, total_src);
    } else {
        let fork = sr.add_vertex(format!("fork_{label}"), SrVertexKind::Fork);
        sr.connect(producer, fork, total_src);
        for k in &sink {
            sr.connect(fork, k.vertex, k.rate);
        }
    }
    Ok(())
}

/// Removes `amount` tokens' worth of slices from the front of `slices`,
/// splitting the boundary slice with a synthesized FORK if `amount` falls
/// inside it rather than on a slice boundary.
fn take_prefix(sr: &mut SrGraph, label: &str, slices: &mut VecDeque<FlowSlice>, mut amount: i64) -> VecDeque<FlowSlice> {
    let mut taken = VecDeque::new();
    while amount > 0 {
        let slice = slices.pop_front().expect("caller ensures enough total rate remains");
        if slice.rate <= amount {
            amount -= slice.rate;
            taken.push_back(slice);
        } else {
            let fork = sr.add_vertex(format!("fork_{label}_split"), SrVertexKind::Fork);
            sr.connect(slice.vertex, fork, slice.rate);
            taken.push_back(FlowSlice { rate: amount, vertex: fork });
            slices.push_front(FlowSlice { rate: slice.rate - amount, vertex: fork });
            amount = 0;
        }
    }
    taken
}

/// Symmetric to [`take_prefix`], removing tokens from the back of `slices`.
fn take_suffix(sr: &mut SrGraph, label: &str, slices: &mut VecDeque<FlowSlice>, mut amount: i64) -> VecDeque<FlowSlice> {
    let mut taken = VecDeque::new();
    while amount > 0 {
        let slice = slices.pop_back().expect("caller ensures enough total rate remains");
        if slice.rate <= amount {
            amount -= slice.rate;
            taken.push_front(slice);
        } else {
            let fork = sr.add_vertex(format!("fork_{label}_split"), SrVertexKind::Fork);
            sr.connect(slice.vertex, fork, slice.rate);
            taken.push_front(FlowSlice { rate: amount, vertex: fork });
            slices.push_back(FlowSlice { rate: slice.rate - amount, vertex: fork });
            amount = 0;
        }
    }
    taken
}

/// Wires a delayed edge as the four-slot placeholder of §4.2 step 5 folding
/// away once all slots resolve: the sink's first `size` tokens come from an
/// INIT vertex (fed by a setter actor if one is configured), the source's
/// last `size` tokens go to an END vertex (forwarded to a getter actor if
/// one is configured), and whatever remains in the middle is wired exactly
/// like an ordinary edge.
fn expand_delay_edge(
    sr: &mut SrGraph,
    label: &str,
    mut source: VecDeque<FlowSlice>,
    mut sink: VecDeque<FlowSlice>,
    delay: &DelaySnap,
    vertices: &[VertexSnap],
    firing_srs: &HashMap<(VertexId, u32), SrVertexId>,
    external_inputs: &HashMap<VertexId, VecDeque<FlowSlice>>,
    hier_outputs: &HashMap<VertexId, HashMap<usize, VecDeque<FlowSlice>>>,
) -> Result<()> {
    let init = sr.add_vertex(format!("init_{label}"), SrVertexKind::Init);
    if let Some(setter) = delay.setter {
        let setter_vec = source_vector(setter, vertices, firing_srs, external_inputs, hier_outputs, delay.size)?;
        walk(sr, &format!("{label}_setter"), setter_vec, VecDeque::from([FlowSlice { rate: delay.size, vertex: init }]))?;
    }

    let init_supply = VecDeque::from([FlowSlice { rate: delay.size, vertex: init }]);
    let sink_prefix = take_prefix(sr, label, &mut sink, delay.size);
    walk(sr, &format!("{label}_init"), init_supply, sink_prefix)?;
    if delay.persistent {
        tag_persistent(sr, init, true, delay.id);
    }

    let end = sr.add_vertex(format!("end_{label}"), SrVertexKind::End);
    let source_suffix = take_suffix(sr, label, &mut source, delay.size);
    walk(sr, &format!("{label}_end"), source_suffix, VecDeque::from([FlowSlice { rate: delay.size, vertex: end }]))?;
    if delay.persistent {
        tag_persistent(sr, end, false, delay.id);
    }
    if let Some(getter) = delay.getter {
        let getter_vec = sink_vector(
            getter,
            vertices.iter().find(|v| v.id == getter.vertex).ok_or_else(|| Error::Validation("delay getter references unknown vertex".to_string()))?,
            firing_srs,
            delay.size,
        )?;
        walk(sr, &format!("{label}_getter"), VecDeque::from([FlowSlice { rate: delay.size, vertex: end }]), getter_vec)?;
    }

    walk(sr, &format!("{label}_live"), source, sink)
}

/// Marks `vertex`'s sole output edge (`is_init`) or sole input edge
/// (INIT/END always have exactly one of each) as carrying `delay`'s
/// persistent storage, so the FIFO allocator (§4.5) routes it to the
/// cross-iteration buffer instead of allocating fresh.
fn tag_persistent(sr: &mut SrGraph, vertex: SrVertexId, is_init: bool, delay: DelayId) {
    let edge_id = if is_init {
        sr.vertex(vertex).and_then(|v| v.outputs().get(0))
    } else {
        sr.vertex(vertex).and_then(|v| v.inputs().get(0))
    };
    if let Some(edge_id) = edge_id {
        if let Some(edge) = sr.edge_mut(edge_id) {
            edge.set_persistent_delay(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spider_pisdf::VertexKind as PK;

    fn flat_graph() -> GraphRepository {
        let mut repo = GraphRepository::new();
        let id = repo.insert_with(|id| Graph::new(id, "g"));
        repo.set_root(id);
        repo
    }

    #[test]
    fn static_homogeneous_chain_has_no_fork_join() {
        let mut repo = flat_graph();
        let root = repo.root().unwrap();
        let g = repo.get_mut(root).unwrap();
        let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 0, 1);
        let b = g.add_vertex("b", PK::Normal { kernel: "b".into() }, 1, 1);
        let c = g.add_vertex("c", PK::Normal { kernel: "c".into() }, 1, 0);
        g.add_edge(a, 0, "1", b, 0, "1").unwrap();
        g.add_edge(b, 0, "1", c, 0, "1").unwrap();

        let sr = expand(&mut repo).unwrap();
        assert_eq!(sr.vertices().count(), 3);
        assert_eq!(sr.edges().count(), 2);
        assert!(sr.vertices().all(|v| matches!(v.kind(), SrVertexKind::Normal { .. })));
    }

    #[test]
    fn upsampling_inserts_a_fork() {
        let mut repo = flat_graph();
        let root = repo.root().unwrap();
        let g = repo.get_mut(root).unwrap();
        let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 0, 1);
        let b = g.add_vertex("b", PK::Normal { kernel: "b".into() }, 1, 0);
        g.add_edge(a, 0, "2", b, 0, "1").unwrap();

        let sr = expand(&mut repo).unwrap();
        assert!(sr.vertices().any(|v| matches!(v.kind(), SrVertexKind::Fork)));
        // One A firing, two B firings (R_A=1, R_B=2).
        assert_eq!(sr.vertices().filter(|v| matches!(v.kind(), SrVertexKind::Normal { .. })).count(), 3);
    }

    #[test]
    fn self_loop_delay_inserts_init_and_end() {
        let mut repo = flat_graph();
        let root = repo.root().unwrap();
        let g = repo.get_mut(root).unwrap();
        let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 1, 1);
        let e = g.add_edge(a, 0, "1", a, 0, "1").unwrap();
        g.add_delay(e, "1", true).unwrap();

        let sr = expand(&mut repo).unwrap();
        assert!(sr.vertices().any(|v| matches!(v.kind(), SrVertexKind::Init)));
        assert!(sr.vertices().any(|v| matches!(v.kind(), SrVertexKind::End)));
    }

    #[test]
    fn insufficient_self_loop_delay_is_rejected() {
        let mut repo = flat_graph();
        let root = repo.root().unwrap();
        let g = repo.get_mut(root).unwrap();
        let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 1, 1);
        let e = g.add_edge(a, 0, "1", a, 0, "1").unwrap();
        g.add_delay(e, "0", true).unwrap();

        let err = expand(&mut repo).unwrap_err();
        assert!(matches!(err, Error::InsufficientDelay { .. }));
    }

    #[test]
    fn zero_rate_edge_produces_no_sr_edges() {
        let mut repo = flat_graph();
        let root = repo.root().unwrap();
        let g = repo.get_mut(root).unwrap();
        let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 0, 1);
        let b = g.add_vertex("b", PK::Normal { kernel: "b".into() }, 1, 0);
        g.add_edge(a, 0, "0", b, 0, "0").unwrap();

        let sr = expand(&mut repo).unwrap();
        assert_eq!(sr.edges().count(), 0);
    }

    #[test]
    fn hierarchical_vertex_expands_its_subgraph() {
        let mut repo = GraphRepository::new();
        let sub = repo.insert_with(|id| {
            let mut g = Graph::new(id, "sub");
            let input = g.add_input_interface("in", 1);
            let inner = g.add_vertex("inner", PK::Normal { kernel: "inner".into() }, 1, 1);
            let output = g.add_output_interface("out", 1);
            g.add_edge(input, 0, "1", inner, 0, "1").unwrap();
            g.add_edge(inner, 0, "1", output, 0, "1").unwrap();
            g
        });
        let root = repo.insert_with(|id| {
            let mut g = Graph::new(id, "top");
            let a = g.add_vertex("a", PK::Normal { kernel: "a".into() }, 0, 1);
            let h = g.add_vertex("h", PK::Hierarchical { body: sub }, 1, 1);
            let b = g.add_vertex("b", PK::Normal { kernel: "b".into() }, 1, 0);
            g.add_edge(a, 0, "1", h, 0, "1").unwrap();
            g.add_edge(h, 0, "1", b, 0, "1").unwrap();
            g
        });
        repo.set_root(root);

        let sr = expand(&mut repo).unwrap();
        // a, b, and the subgraph's single "inner" firing.
        assert_eq!(sr.vertices().filter(|v| matches!(v.kind(), SrVertexKind::Normal { .. })).count(), 3);
        assert_eq!(sr.edges().count(), 2);
    }
}
