//! Delays: initial tokens sitting on an edge at the start of an iteration.
//!
//! Grounded on `original_source/libspider/graphs/pisdf/Delay.h`. A delay's
//! size is itself an [`Expression`] (dynamic delays set by a setter actor
//! are supported, mirroring `setterRateExpression`/`getterRateExpression`).
//! `persistent` controls whether the allocator keeps the delay's buffer
//! alive across loop iterations or tears it down each time (§4.5/§5).

use crate::edge::EdgeEndpoint;
use crate::ids::{DelayId, EdgeId};
use spider_expr::{Expression, ParamResolver};
use spider_types::error::Result;

#[derive(Debug, Clone)]
pub struct Delay {
    id: DelayId,
    edge: EdgeId,
    size: Expression,
    setter: Option<EdgeEndpoint>,
    getter: Option<EdgeEndpoint>,
    persistent: bool,
}

impl Delay {
    pub fn new(id: DelayId, edge: EdgeId, size: Expression, persistent: bool) -> Self {
        Self {
            id,
            edge,
            size,
            setter: None,
            getter: None,
            persistent,
        }
    }

    pub fn id(&self) -> DelayId {
        self.id
    }

    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    pub fn size(&self, params: &dyn ParamResolver) -> Result<i64> {
        self.size.evaluate(params)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn setter(&self) -> Option<EdgeEndpoint> {
        self.setter
    }

    pub fn set_setter(&mut self, setter: EdgeEndpoint) {
        self.setter = Some(setter);
    }

    pub fn getter(&self) -> Option<EdgeEndpoint> {
        self.getter
    }

    pub fn set_getter(&mut self, getter: EdgeEndpoint) {
        self.getter = Some(getter);
    }
}
