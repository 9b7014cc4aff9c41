//! The graph container: vertices, edges, delays and parameter scope.
//!
//! This is a minimal construction API, not the full PiSDF builder DSL the
//! original ships (XML/GUI import, visitors, clone helpers) — out of scope
//! per the specification. It gives every later stage (BRV, expansion,
//! optimizer, scheduler) the same shape the original's `Graph`
//! (`original_source/libspider/graphs/pisdf/PiSDFGraph.cpp`) exposes:
//! owned vertices/edges/params plus an ordered list of boundary interfaces.

use crate::delay::Delay;
use crate::edge::{Edge, EdgeEndpoint};
use crate::ids::{DelayId, EdgeId, GraphId, ParamId, VertexId};
use crate::param::{Param, ParamScope};
use crate::vertex::{Vertex, VertexKind};
use spider_expr::Expression;
use spider_types::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Graph {
    id: GraphId,
    name: String,
    vertices: HashMap<VertexId, Vertex>,
    edges: HashMap<EdgeId, Edge>,
    delays: HashMap<DelayId, Delay>,
    params: ParamScope,
    input_interfaces: Vec<VertexId>,
    output_interfaces: Vec<VertexId>,
    next_vertex: u32,
    next_edge: u32,
    next_delay: u32,
    next_param: u32,
}

impl Graph {
    pub fn new(id: GraphId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_vertex(&mut self, name: impl Into<String>, kind: VertexKind, input_count: usize, output_count: usize) -> VertexId {
        let id = VertexId::new(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, Vertex::new(id, name, kind, input_count, output_count));
        id
    }

    pub fn add_input_interface(&mut self, name: impl Into<String>, output_count: usize) -> VertexId {
        let id = self.add_vertex(name, VertexKind::Input, 0, output_count);
        self.input_interfaces.push(id);
        id
    }

    pub fn add_output_interface(&mut self, name: impl Into<String>, input_count: usize) -> VertexId {
        let id = self.add_vertex(name, VertexKind::Output, input_count, 0);
        self.output_interfaces.push(id);
        id
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn input_interfaces(&self) -> &[VertexId] {
        &self.input_interfaces
    }

    pub fn output_interfaces(&self) -> &[VertexId] {
        &self.output_interfaces
    }

    /// Connects `source`'s output port `src_port` to `sink`'s input port
    /// `snk_port`, compiling both rate expressions. Fails if either port is
    /// already occupied.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        src_port: usize,
        source_rate: &str,
        sink: VertexId,
        snk_port: usize,
        sink_rate: &str,
    ) -> Result<EdgeId> {
        if self.vertices.get(&source).and_then(|v| v.outputs().get(src_port)).is_some() {
            return Err(Error::Validation(format!("output port {src_port} of vertex {source} already connected")));
        }
        if self.vertices.get(&sink).and_then(|v| v.inputs().get(snk_port)).is_some() {
            return Err(Error::Validation(format!("input port {snk_port} of vertex {sink} already connected")));
        }
        let id = EdgeId::new(self.next_edge);
        self.next_edge += 1;
        let edge = Edge::new(
            id,
            EdgeEndpoint { vertex: source, port: src_port },
            Expression::compile(source_rate)?,
            EdgeEndpoint { vertex: sink, port: snk_port },
            Expression::compile(sink_rate)?,
        );
        self.edges.insert(id, edge);
        if let Some(v) = self.vertices.get_mut(&source) {
            v.outputs_mut().set(src_port, id);
        }
        if let Some(v) = self.vertices.get_mut(&sink) {
            v.inputs_mut().set(snk_port, id);
        }
        Ok(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn add_delay(&mut self, edge_id: EdgeId, size_expr: &str, persistent: bool) -> Result<DelayId> {
        let id = DelayId(self.next_delay);
        self.next_delay += 1;
        let delay = Delay::new(id, edge_id, Expression::compile(size_expr)?, persistent);
        self.delays.insert(id, delay);
        if let Some(edge) = self.edges.get_mut(&edge_id) {
            edge.set_delay(id);
        } else {
            return Err(Error::Validation(format!("cannot attach delay to unknown edge {edge_id}")));
        }
        Ok(id)
    }

    pub fn delay(&self, id: DelayId) -> Option<&Delay> {
        self.delays.get(&id)
    }

    pub fn delays(&self) -> impl Iterator<Item = &Delay> {
        self.delays.values()
    }

    pub fn params(&self) -> &ParamScope {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamScope {
        &mut self.params
    }

    pub fn add_static_param(&mut self, name: impl Into<String>, value: i64) -> Result<ParamId> {
        let id = ParamId::new(self.next_param);
        self.next_param += 1;
        self.params.insert(Param::new_static(id, name, value)?)?;
        Ok(id)
    }

    pub fn add_dynamic_param(&mut self, name: impl Into<String>) -> Result<ParamId> {
        let id = ParamId::new(self.next_param);
        self.next_param += 1;
        self.params.insert(Param::new_dynamic(id, name)?)?;
        Ok(id)
    }

    pub fn add_dependent_param(&mut self, name: impl Into<String>, expr: &str) -> Result<ParamId> {
        let id = ParamId::new(self.next_param);
        self.next_param += 1;
        self.params.insert(Param::new_dependent(id, name, Expression::compile(expr)?)?)?;
        Ok(id)
    }

    pub fn add_inherited_param(&mut self, name: impl Into<String>, parent: ParamId) -> Result<ParamId> {
        let id = ParamId::new(self.next_param);
        self.next_param += 1;
        self.params.insert(Param::new_inherited(id, name, parent)?)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(graph: &mut Graph, name: &str, ins: usize, outs: usize) -> VertexId {
        graph.add_vertex(name, VertexKind::Normal { kernel: name.to_string() }, ins, outs)
    }

    #[test]
    fn add_edge_rejects_double_connection_on_same_port() {
        let mut g = Graph::new(GraphId::new(0), "g");
        let a = normal(&mut g, "a", 0, 1);
        let b = normal(&mut g, "b", 1, 0);
        let c = normal(&mut g, "c", 1, 0);
        g.add_edge(a, 0, "1", b, 0, "1").unwrap();
        assert!(g.add_edge(a, 0, "1", c, 0, "1").is_err());
    }

    #[test]
    fn add_delay_attaches_to_edge() {
        let mut g = Graph::new(GraphId::new(0), "g");
        let a = normal(&mut g, "a", 1, 1);
        let e = g.add_edge(a, 0, "1", a, 0, "1").unwrap();
        let d = g.add_delay(e, "1", true).unwrap();
        assert_eq!(g.edge(e).unwrap().delay(), Some(d));
    }

    #[test]
    fn interfaces_are_tracked_in_insertion_order() {
        let mut g = Graph::new(GraphId::new(0), "g");
        let in0 = g.add_input_interface("in0", 1);
        let in1 = g.add_input_interface("in1", 1);
        assert_eq!(g.input_interfaces(), &[in0, in1]);
    }
}
