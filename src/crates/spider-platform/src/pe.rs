//! Processing elements.
//!
//! Grounded on `original_source/libspider/archi/PE.h`: a PE carries a
//! user-defined hardware type/ix pair (opaque to the scheduler, meaningful
//! only to the kernel timing model), belongs to exactly one cluster, can be
//! the LRT that manages itself or another PE, and can be disabled without
//! being removed from the platform.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeRole {
    /// Runs a Local Run-Time dispatcher loop and accepts job messages.
    Lrt,
    /// A worker core with no dispatcher of its own; jobs run inline once an
    /// LRT dispatches them.
    Worker,
}

#[derive(Debug, Clone)]
pub struct Pe {
    virtual_ix: usize,
    hw_type: u32,
    hw_ix: u32,
    name: String,
    role: PeRole,
    affinity: Option<i32>,
    enabled: bool,
}

impl Pe {
    pub fn new(virtual_ix: usize, hw_type: u32, hw_ix: u32, name: impl Into<String>, role: PeRole) -> Self {
        Self {
            virtual_ix,
            hw_type,
            hw_ix,
            name: name.into(),
            role,
            affinity: None,
            enabled: true,
        }
    }

    pub fn with_affinity(mut self, affinity: i32) -> Self {
        self.affinity = Some(affinity);
        self
    }

    pub fn virtual_ix(&self) -> usize {
        self.virtual_ix
    }

    pub fn hardware_type(&self) -> u32 {
        self.hw_type
    }

    pub fn hardware_ix(&self) -> u32 {
        self.hw_ix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> PeRole {
        self.role
    }

    pub fn is_lrt(&self) -> bool {
        self.role == PeRole::Lrt
    }

    pub fn affinity(&self) -> Option<i32> {
        self.affinity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}
