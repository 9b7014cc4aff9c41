//! Graph vertices.

pub mod kind;

pub use kind::VertexKind;

use crate::ids::{EdgeId, VertexId};

/// A single input or output port, tracked by index so edges can be added
/// and removed without shifting sibling ports (`original_source/.../Edge.h`
/// keeps `srcPortIx_`/`snkPortIx_` the same way).
#[derive(Debug, Clone, Default)]
pub struct PortTable {
    slots: Vec<Option<EdgeId>>,
}

impl PortTable {
    pub fn with_count(count: usize) -> Self {
        Self { slots: vec![None; count] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<EdgeId> {
        self.slots.get(ix).copied().flatten()
    }

    pub fn set(&mut self, ix: usize, edge: EdgeId) {
        if ix >= self.slots.len() {
            self.slots.resize(ix + 1, None);
        }
        self.slots[ix] = Some(edge);
    }

    pub fn push(&mut self, edge: EdgeId) -> usize {
        self.slots.push(Some(edge));
        self.slots.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<EdgeId>> + '_ {
        self.slots.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    name: String,
    kind: VertexKind,
    inputs: PortTable,
    outputs: PortTable,
    repetition_value: Option<u32>,
}

impl Vertex {
    pub fn new(id: VertexId, name: impl Into<String>, kind: VertexKind, input_count: usize, output_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            inputs: PortTable::with_count(input_count),
            outputs: PortTable::with_count(output_count),
            repetition_value: None,
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    pub fn inputs(&self) -> &PortTable {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut PortTable {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &PortTable {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut PortTable {
        &mut self.outputs
    }

    pub fn repetition_value(&self) -> Option<u32> {
        self.repetition_value
    }

    pub fn set_repetition_value(&mut self, value: u32) {
        self.repetition_value = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_table_grows_on_set_past_initial_len() {
        let mut ports = PortTable::with_count(1);
        ports.set(3, EdgeId(9));
        assert_eq!(ports.len(), 4);
        assert_eq!(ports.get(3), Some(EdgeId(9)));
        assert_eq!(ports.get(1), None);
    }

    #[test]
    fn push_appends_and_returns_index() {
        let mut ports = PortTable::default();
        let ix = ports.push(EdgeId(1));
        assert_eq!(ix, 0);
        assert_eq!(ports.push(EdgeId(2)), 1);
    }
}
