//! Memory buses and their cost models.
//!
//! Grounded on `original_source/libspider/api/archi-api.h`'s
//! `createMemoryBus`/`createInterClusterMemoryBus`: a bus is a pair of
//! user-overridable cost routines (one per direction). Rather than function
//! pointers this crate models the cost routine as a small trait so a host
//! application can supply a closure, a lookup table, or a fixed-rate model
//! without unsafe function pointer plumbing.

use spider_types::error::{Error, Result};

/// Computes the cost, in platform time units, of transferring `bytes` over
/// a bus.
pub trait BusCostModel: std::fmt::Debug + Send + Sync {
    fn cost(&self, bytes: u64) -> Result<u64>;
}

/// `original_source/.../archi-api.h`'s `defaultZeroCommunicationCost`: free
/// transfers, useful for shared-memory buses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCost;

impl BusCostModel for ZeroCost {
    fn cost(&self, _bytes: u64) -> Result<u64> {
        Ok(0)
    }
}

/// `defaultInfiniteCommunicationCost`: forbids a transfer from ever being
/// chosen by the mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfiniteCost;

impl BusCostModel for InfiniteCost {
    fn cost(&self, _bytes: u64) -> Result<u64> {
        Ok(u64::MAX)
    }
}

/// A fixed-bandwidth model: `cost = ceil(bytes / bytes_per_unit_time)`.
#[derive(Debug, Clone, Copy)]
pub struct LinearCost {
    pub bytes_per_unit_time: u64,
}

impl BusCostModel for LinearCost {
    fn cost(&self, bytes: u64) -> Result<u64> {
        if self.bytes_per_unit_time == 0 {
            return Err(Error::BusOverflow { bytes });
        }
        Ok(bytes.div_ceil(self.bytes_per_unit_time))
    }
}

/// One direction of traffic between two clusters.
#[derive(Debug)]
pub struct MemoryBus {
    pub send_cost: Box<dyn BusCostModel>,
    pub receive_cost: Box<dyn BusCostModel>,
}

impl MemoryBus {
    pub fn new(send_cost: impl BusCostModel + 'static, receive_cost: impl BusCostModel + 'static) -> Self {
        Self {
            send_cost: Box::new(send_cost),
            receive_cost: Box::new(receive_cost),
        }
    }

    pub fn uniform(cost: impl BusCostModel + Clone + 'static) -> Self {
        Self::new(cost.clone(), cost)
    }
}

/// Bidirectional link between two clusters, keyed by cluster index pair in
/// [`crate::platform::Platform`].
#[derive(Debug)]
pub struct InterClusterBus {
    pub a_to_b: MemoryBus,
    pub b_to_a: MemoryBus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_cost_rounds_up() {
        let model = LinearCost { bytes_per_unit_time: 4 };
        assert_eq!(model.cost(9).unwrap(), 3);
        assert_eq!(model.cost(8).unwrap(), 2);
    }

    #[test]
    fn zero_rate_linear_cost_is_an_error() {
        let model = LinearCost { bytes_per_unit_time: 0 };
        assert!(model.cost(1).is_err());
    }
}
