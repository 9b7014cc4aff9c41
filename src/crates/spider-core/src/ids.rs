//! Numeric ids for the single-rate graph and the scheduling layer built on
//! top of it. Kept distinct from [`spider_pisdf`]'s ids: an `SrVertexId` is
//! a firing, not a PiSDF vertex, and a schedule indexes `Task`s by a third,
//! dispatch-order id.

use std::fmt;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(v: u32) -> Self {
                Self(v)
            }

            pub fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(SrVertexId);
numeric_id!(SrEdgeId);
numeric_id!(TaskId);
numeric_id!(FifoId);
