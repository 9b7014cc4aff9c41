//! Basic Repetition Vector solver.
//!
//! Ports the LCM-based method from
//! `original_source/libspider/libspider/graphs-tools/brv/LCMBRVCompute.cpp`
//! and `original_source/.../numerical/brv.h`: partition the graph into
//! connected components over its non-interface vertices, propagate a
//! rational firing-count ratio across each component's edges, scale by the
//! component's LCM of denominators to land on integers, then check that
//! every edge's `rate * repetition` agrees on both ends.
//!
//! Interface vertices act as a fixed anchor of rational `1/1` rather than a
//! propagated unknown, matching the original's `dummyRational` (it starts
//! non-zero, so the "still unresolved" branch that would otherwise assign it
//! a value never triggers).

use crate::edge::{Edge, EdgeEndpoint};
use crate::graph::Graph;
use crate::ids::VertexId;
use spider_expr::ParamResolver;
use spider_types::error::{Error, Result};
use crate::ids::EdgeId;
use spider_types::rational::{lcm, Rational};
use std::collections::HashMap;

/// Union-find over a fixed universe of vertex ids.
struct UnionFind {
    parent: HashMap<VertexId, VertexId>,
}

impl UnionFind {
    fn new(ids: impl Iterator<Item = VertexId>) -> Self {
        let parent = ids.map(|id| (id, id)).collect();
        Self { parent }
    }

    fn find(&mut self, id: VertexId) -> VertexId {
        let p = self.parent[&id];
        if p == id {
            id
        } else {
            let root = self.find(p);
            self.parent.insert(id, root);
            root
        }
    }

    fn union(&mut self, a: VertexId, b: VertexId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

fn is_interface(graph: &Graph, id: VertexId) -> bool {
    graph.vertex(id).map(|v| v.kind().is_interface()).unwrap_or(false)
}

/// Computes and writes back the repetition value of every non-interface
/// vertex in `graph`.
pub fn compute(graph: &mut Graph, params: &dyn ParamResolver) -> Result<()> {
    let real_vertices: Vec<VertexId> = graph
        .vertices()
        .filter(|v| !v.kind().is_interface())
        .map(|v| v.id())
        .collect();

    let mut uf = UnionFind::new(real_vertices.iter().copied());
    for edge in graph.edges() {
        let src = edge.source().vertex;
        let snk = edge.sink().vertex;
        if !is_interface(graph, src) && !is_interface(graph, snk) {
            uf.union(src, snk);
        }
    }

    let mut groups: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for &v in &real_vertices {
        let root = uf.find(v);
        groups.entry(root).or_default().push(v);
    }

    let edges: Vec<&Edge> = graph.edges().collect();
    let mut component_edges: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
    for edge in &edges {
        let src = edge.source().vertex;
        let snk = edge.sink().vertex;
        let owner = if !is_interface(graph, src) {
            Some(uf.find(src))
        } else if !is_interface(graph, snk) {
            Some(uf.find(snk))
        } else {
            None
        };
        if let Some(root) = owner {
            component_edges.entry(root).or_default().push(edge.id());
        }
    }

    let mut reps: HashMap<VertexId, Rational> = real_vertices.iter().map(|&v| (v, Rational::default())).collect();

    for (root, members) in &groups {
        let edge_ids = component_edges.get(root).cloned().unwrap_or_default();
        extract_rationals(graph, &edge_ids, &mut reps, params)?;

        let lcm_factor = members
            .iter()
            .fold(1i64, |acc, v| lcm(acc, reps[v].denominator()));

        for &v in members {
            let value = (reps[&v] * lcm_factor).to_i64();
            let value = if value == 0 { 1 } else { value };
            graph
                .vertex_mut(v)
                .expect("vertex present in its own component")
                .set_repetition_value(value as u32);
        }

        check_validity(graph, &edge_ids, params)?;
    }

    Ok(())
}

fn extract_rationals(
    graph: &Graph,
    edge_ids: &[EdgeId],
    reps: &mut HashMap<VertexId, Rational>,
    params: &dyn ParamResolver,
) -> Result<()> {
    let anchor = Rational::from_int(1);
    for &edge_id in edge_ids {
        let edge = graph.edge(edge_id).expect("edge id originated from this graph");
        let source_rate = edge.source_rate(params)?;
        let sink_rate = edge.sink_rate(params)?;
        check_rate_pair(graph, edge, source_rate, sink_rate)?;

        let src = edge.source().vertex;
        let snk = edge.sink().vertex;
        let src_is_iface = is_interface(graph, src);
        let snk_is_iface = is_interface(graph, snk);

        let source_current = if src_is_iface { anchor } else { reps[&src] };
        let sink_current = if snk_is_iface { anchor } else { reps[&snk] };

        let mut new_sink = sink_current;
        if sink_current.numerator() == 0 && sink_rate != 0 {
            new_sink = Rational::new(source_rate, sink_rate);
            if source_current.numerator() != 0 {
                new_sink = new_sink * source_current;
            }
        }

        let mut new_source = source_current;
        if source_current.numerator() == 0 && source_rate != 0 {
            new_source = Rational::new(sink_rate, source_rate);
            if new_sink.numerator() != 0 {
                new_source = new_source * new_sink;
            }
        }

        if !snk_is_iface {
            reps.insert(snk, new_sink);
        }
        if !src_is_iface {
            reps.insert(src, new_source);
        }
    }
    Ok(())
}

fn check_rate_pair(graph: &Graph, edge: &Edge, source_rate: i64, sink_rate: i64) -> Result<()> {
    // Open Question: an edge whose rates are BOTH zero is treated as
    // inactive and silently skipped, matching how the original only
    // rejects a one-sided zero (XOR), never a both-zero edge.
    if (sink_rate == 0) != (source_rate == 0) {
        return Err(Error::InconsistentRates {
            source: vertex_name(graph, edge.source()),
            sink: vertex_name(graph, edge.sink()),
            source_rate,
            sink_rate,
            source_rep: 0,
            sink_rep: 0,
        });
    }
    Ok(())
}

fn check_validity(graph: &Graph, edge_ids: &[EdgeId], params: &dyn ParamResolver) -> Result<()> {
    for &edge_id in edge_ids {
        let edge = graph.edge(edge_id).expect("edge id originated from this graph");
        let src = edge.source().vertex;
        let snk = edge.sink().vertex;
        if is_interface(graph, src) || is_interface(graph, snk) {
            continue;
        }
        let source_rate = edge.source_rate(params)?;
        let sink_rate = edge.sink_rate(params)?;
        let source_rep = graph.vertex(src).and_then(|v| v.repetition_value()).unwrap_or(1);
        let sink_rep = graph.vertex(snk).and_then(|v| v.repetition_value()).unwrap_or(1);

        for (id, rep, kind_label) in [(src, source_rep, "source"), (snk, sink_rep, "sink")] {
            if let Some(vertex) = graph.vertex(id) {
                if vertex.kind().requires_unit_repetition() && rep != 1 {
                    return Err(Error::InvalidSpecialRepetition {
                        vertex: vertex.name().to_string(),
                        kind: vertex.kind().label(),
                        repetition: rep,
                    });
                }
                let _ = kind_label;
            }
        }

        if source_rate * i64::from(source_rep) != sink_rate * i64::from(sink_rep) {
            return Err(Error::InconsistentRates {
                source: vertex_name(graph, edge.source()),
                sink: vertex_name(graph, edge.sink()),
                source_rate,
                sink_rate,
                source_rep,
                sink_rep,
            });
        }
    }
    Ok(())
}

fn vertex_name(graph: &Graph, endpoint: EdgeEndpoint) -> String {
    graph.vertex(endpoint.vertex).map(|v| v.name().to_string()).unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::VertexKind;
    use spider_expr::NoParams;

    fn actor(g: &mut Graph, name: &str, ins: usize, outs: usize) -> VertexId {
        g.add_vertex(name, VertexKind::Normal { kernel: name.to_string() }, ins, outs)
    }

    #[test]
    fn homogeneous_rates_give_repetition_one() {
        let mut g = Graph::new(crate::ids::GraphId::new(0), "g");
        let a = actor(&mut g, "a", 0, 1);
        let b = actor(&mut g, "b", 1, 0);
        g.add_edge(a, 0, "4", b, 0, "4").unwrap();
        compute(&mut g, &NoParams).unwrap();
        assert_eq!(g.vertex(a).unwrap().repetition_value(), Some(1));
        assert_eq!(g.vertex(b).unwrap().repetition_value(), Some(1));
    }

    #[test]
    fn up_sampling_scales_sink_repetition() {
        let mut g = Graph::new(crate::ids::GraphId::new(0), "g");
        let a = actor(&mut g, "a", 0, 1);
        let b = actor(&mut g, "b", 1, 0);
        // a produces 1, b consumes 4 => b fires once per 4 a-firings: a:4, b:1
        g.add_edge(a, 0, "1", b, 0, "4").unwrap();
        compute(&mut g, &NoParams).unwrap();
        assert_eq!(g.vertex(a).unwrap().repetition_value(), Some(4));
        assert_eq!(g.vertex(b).unwrap().repetition_value(), Some(1));
    }

    #[test]
    fn inconsistent_one_sided_zero_rate_errors() {
        let mut g = Graph::new(crate::ids::GraphId::new(0), "g");
        let a = actor(&mut g, "a", 0, 1);
        let b = actor(&mut g, "b", 1, 0);
        g.add_edge(a, 0, "0", b, 0, "4").unwrap();
        assert!(compute(&mut g, &NoParams).is_err());
    }

    #[test]
    fn config_actor_must_have_unit_repetition() {
        let mut g = Graph::new(crate::ids::GraphId::new(0), "g");
        let cfg = g.add_vertex("cfg", VertexKind::Config { kernel: "cfg".into() }, 0, 1);
        let b = actor(&mut g, "b", 1, 0);
        // cfg produces 1, b consumes 2 => cfg would need repetition 2, which
        // is invalid for a config actor.
        g.add_edge(cfg, 0, "1", b, 0, "2").unwrap();
        let err = compute(&mut g, &NoParams).unwrap_err();
        assert!(matches!(err, Error::InvalidSpecialRepetition { .. }));
    }

    #[test]
    fn disconnected_components_solve_independently() {
        let mut g = Graph::new(crate::ids::GraphId::new(0), "g");
        let a = actor(&mut g, "a", 0, 1);
        let b = actor(&mut g, "b", 1, 0);
        let c = actor(&mut g, "c", 0, 1);
        let d = actor(&mut g, "d", 1, 0);
        g.add_edge(a, 0, "2", b, 0, "4").unwrap();
        g.add_edge(c, 0, "3", d, 0, "1").unwrap();
        compute(&mut g, &NoParams).unwrap();
        assert_eq!(g.vertex(a).unwrap().repetition_value(), Some(2));
        assert_eq!(g.vertex(b).unwrap().repetition_value(), Some(1));
        assert_eq!(g.vertex(c).unwrap().repetition_value(), Some(1));
        assert_eq!(g.vertex(d).unwrap().repetition_value(), Some(3));
    }
}
