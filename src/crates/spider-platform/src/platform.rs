//! The platform: every cluster and the inter-cluster buses between them.
//!
//! Grounded on `original_source/libspider/archi/Platform.cpp` and
//! `api/archi-api.h`'s `createPlatform`/`createInterClusterMemoryBus`. Only
//! one platform exists per run in the original, built once through
//! `archi::platform()`; here it is an explicit value the runtime context
//! owns and passes down, per the REDESIGN FLAG that replaces global statics
//! with owned context objects.

use crate::bus::InterClusterBus;
use crate::cluster::{Cluster, ClusterIx};
use crate::pe::Pe;
use spider_types::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug)]
pub struct Platform {
    clusters: Vec<Cluster>,
    buses: HashMap<(ClusterIx, ClusterIx), InterClusterBus>,
    grt_cluster: Option<ClusterIx>,
}

impl Platform {
    pub fn new() -> Self {
        Self {
            clusters: Vec::new(),
            buses: HashMap::new(),
            grt_cluster: None,
        }
    }

    pub fn add_cluster(&mut self, cluster: Cluster) -> ClusterIx {
        let ix = cluster.ix();
        self.clusters.push(cluster);
        ix
    }

    pub fn set_grt_cluster(&mut self, ix: ClusterIx) {
        self.grt_cluster = Some(ix);
    }

    pub fn grt_cluster(&self) -> Option<ClusterIx> {
        self.grt_cluster
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, ix: ClusterIx) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.ix() == ix)
    }

    pub fn cluster_mut(&mut self, ix: ClusterIx) -> Option<&mut Cluster> {
        self.clusters.iter_mut().find(|c| c.ix() == ix)
    }

    pub fn pe_count(&self) -> usize {
        self.clusters.iter().map(|c| c.pes().len()).sum()
    }

    pub fn lrt_count(&self) -> usize {
        self.clusters.iter().flat_map(|c| c.pes()).filter(|pe| pe.is_lrt()).count()
    }

    pub fn lrts(&self) -> impl Iterator<Item = &Pe> {
        self.clusters.iter().flat_map(|c| c.pes()).filter(|pe| pe.is_lrt())
    }

    /// `createInterClusterMemoryBus`, keyed both directions so lookups never
    /// need to know which side is "A".
    pub fn add_inter_cluster_bus(&mut self, a: ClusterIx, b: ClusterIx, bus: InterClusterBus) {
        self.buses.insert((a, b), bus);
    }

    /// `Platform::dataCommunicationCostPEToPE`: cost of moving `bytes` from
    /// a PE in `source` to a PE in `dest`. Zero within the same cluster
    /// (shared memory, no bus involved).
    pub fn data_communication_cost(&self, source: ClusterIx, dest: ClusterIx, bytes: u64) -> Result<u64> {
        let (send, receive) = self.data_communication_costs(source, dest, bytes)?;
        Ok(send.saturating_add(receive))
    }

    /// Same lookup as [`Self::data_communication_cost`] but split into the
    /// send-side and receive-side cost, for the mapper's SEND/RECEIVE task
    /// synthesis (§4.4 step 3), where each half becomes its own task's
    /// execution time.
    pub fn data_communication_costs(&self, source: ClusterIx, dest: ClusterIx, bytes: u64) -> Result<(u64, u64)> {
        if source == dest {
            return Ok((0, 0));
        }
        if let Some(bus) = self.buses.get(&(source, dest)) {
            return Ok((bus.a_to_b.send_cost.cost(bytes)?, bus.a_to_b.receive_cost.cost(bytes)?));
        }
        if let Some(bus) = self.buses.get(&(dest, source)) {
            return Ok((bus.b_to_a.send_cost.cost(bytes)?, bus.b_to_a.receive_cost.cost(bytes)?));
        }
        Err(Error::Validation(format!("no inter-cluster bus configured between cluster {} and {}", source.0, dest.0)))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MemoryBus, ZeroCost};
    use crate::pe::PeRole;

    #[test]
    fn same_cluster_transfer_is_free() {
        let mut platform = Platform::new();
        let mut c = Cluster::new(ClusterIx(0), "c0", 1024);
        c.add_pe(Pe::new(0, 0, 0, "pe0", PeRole::Worker));
        platform.add_cluster(c);
        assert_eq!(platform.data_communication_cost(ClusterIx(0), ClusterIx(0), 100).unwrap(), 0);
    }

    #[test]
    fn missing_bus_between_clusters_is_an_error() {
        let mut platform = Platform::new();
        platform.add_cluster(Cluster::new(ClusterIx(0), "c0", 1024));
        platform.add_cluster(Cluster::new(ClusterIx(1), "c1", 1024));
        assert!(platform.data_communication_cost(ClusterIx(0), ClusterIx(1), 10).is_err());
    }

    #[test]
    fn configured_bus_is_used_in_either_direction() {
        let mut platform = Platform::new();
        platform.add_cluster(Cluster::new(ClusterIx(0), "c0", 1024));
        platform.add_cluster(Cluster::new(ClusterIx(1), "c1", 1024));
        platform.add_inter_cluster_bus(
            ClusterIx(0),
            ClusterIx(1),
            InterClusterBus {
                a_to_b: MemoryBus::uniform(ZeroCost),
                b_to_a: MemoryBus::uniform(ZeroCost),
            },
        );
        assert_eq!(platform.data_communication_cost(ClusterIx(1), ClusterIx(0), 10).unwrap(), 0);
    }
}
