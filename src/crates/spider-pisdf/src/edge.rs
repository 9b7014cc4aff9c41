//! Edges connecting vertex ports.
//!
//! Grounded on `original_source/libspider/graphs/pisdf/Edge.h`: a source
//! vertex/port pair, a sink vertex/port pair, one rate expression on each
//! side, and an optional associated delay.

use crate::ids::{DelayId, EdgeId, VertexId};
use spider_expr::{Expression, ParamResolver};
use spider_types::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct EdgeEndpoint {
    pub vertex: VertexId,
    pub port: usize,
}

#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source: EdgeEndpoint,
    source_rate: Expression,
    sink: EdgeEndpoint,
    sink_rate: Expression,
    delay: Option<DelayId>,
}

impl Edge {
    pub fn new(id: EdgeId, source: EdgeEndpoint, source_rate: Expression, sink: EdgeEndpoint, sink_rate: Expression) -> Self {
        Self {
            id,
            source,
            source_rate,
            sink,
            sink_rate,
            delay: None,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> EdgeEndpoint {
        self.source
    }

    pub fn sink(&self) -> EdgeEndpoint {
        self.sink
    }

    pub fn source_rate_expr(&self) -> &Expression {
        &self.source_rate
    }

    pub fn sink_rate_expr(&self) -> &Expression {
        &self.sink_rate
    }

    pub fn source_rate(&self, params: &dyn ParamResolver) -> Result<i64> {
        self.source_rate.evaluate(params)
    }

    pub fn sink_rate(&self, params: &dyn ParamResolver) -> Result<i64> {
        self.sink_rate.evaluate(params)
    }

    pub fn delay(&self) -> Option<DelayId> {
        self.delay
    }

    pub fn set_delay(&mut self, delay: DelayId) {
        self.delay = Some(delay);
    }

    /// Name format `#source -> #sink`, matching `Edge::name()` in the
    /// original.
    pub fn name(&self, source_name: &str, sink_name: &str) -> String {
        format!("{source_name} -> {sink_name}")
    }
}
