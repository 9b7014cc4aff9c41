//! Lightweight numeric ids for vertices, edges, graphs and tasks.
//!
//! Kept as plain newtypes over `u32`/`u64` rather than UUIDs: repetition
//! vectors and channel-version maps index by these ids on every superstep,
//! so they need to be `Copy` and cheap to hash.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn new(v: $inner) -> Self {
                Self(v)
            }

            pub fn get(&self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }
    };
}

numeric_id!(VertexId, u32);
numeric_id!(EdgeId, u32);
numeric_id!(GraphId, u32);
numeric_id!(ParamId, u32);

/// Monotonically increasing id allocator scoped to one graph/subgraph
/// instance, mirroring how the teacher's Pregel checkpoint ids are minted
/// per compiled graph rather than globally.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_vertex(&mut self) -> VertexId {
        let id = self.next;
        self.next += 1;
        VertexId(id)
    }

    pub fn next_edge(&mut self) -> EdgeId {
        let id = self.next;
        self.next += 1;
        EdgeId(id)
    }
}
