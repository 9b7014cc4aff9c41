//! Re-export of the shared id newtypes plus the delay/interface ids this
//! crate adds on top of them.

pub use spider_types::{EdgeId, GraphId, ParamId, VertexId};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DelayId(pub u32);

impl fmt::Display for DelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
