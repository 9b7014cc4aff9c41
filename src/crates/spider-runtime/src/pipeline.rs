//! The orchestrator that owns one platform and kernel registry across many
//! iterations: spawns one `tokio` task per LRT, drives the GRT protocol
//! through [`crate::grt::run_iteration`], and closes the parameter feedback
//! loop described by §4.6 step 3 between a config-only pre-pass and the
//! full iteration.

use crate::bus::{Bus, GrtInbox};
use crate::grt::{self, IterationReport};
use crate::kernel::KernelRegistry;
use crate::lrt;
use crate::notification::{Notification, NotificationKind, Sender};
use spider_core::{allocate_fifos, expand, expand_config_only, optimize, schedule, PeRef, SrGraph, SrVertex, SrVertexKind, TaskId};
use spider_pisdf::GraphRepository;
use spider_platform::Platform;
use spider_types::config::RuntimeConfig;
use spider_types::error::{Error, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running set of LRT reactors plus the shared bus, kernel registry and
/// GRT inbox they were spawned with. One `Runtime` drives as many
/// iterations as the caller wants (via [`Runtime::run_iteration`]) before
/// being torn down with [`Runtime::shutdown`].
pub struct Runtime {
    bus: Arc<Bus>,
    grt_inbox: GrtInbox,
    platform: Platform,
    config: RuntimeConfig,
    handles: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Spawns one reactor task per LRT on `platform` (§4.6 "one LRT per
    /// `tokio::spawn`ed task" -- REDESIGN FLAG, `DESIGN.md`).
    pub fn spawn(platform: Platform, config: RuntimeConfig, kernels: KernelRegistry) -> Self {
        let lrts: Vec<PeRef> = platform
            .clusters()
            .iter()
            .flat_map(|c| c.pes().iter().filter(|pe| pe.is_lrt()).map(|pe| PeRef { cluster: c.ix(), virtual_ix: pe.virtual_ix() }))
            .collect();
        let (bus, inboxes, grt_inbox) = Bus::new(lrts.iter().copied());
        let bus = Arc::new(bus);
        let kernels = Arc::new(kernels);

        let mut handles = Vec::new();
        for (id, inbox) in inboxes {
            let bus = Arc::clone(&bus);
            let kernels = Arc::clone(&kernels);
            handles.push(tokio::spawn(async move { lrt::run(id, bus, kernels, inbox).await }));
        }

        Self { bus, grt_inbox, platform, config, handles }
    }

    pub fn lrt_ids(&self) -> Vec<PeRef> {
        self.bus.lrt_ids().collect()
    }

    /// Runs one complete iteration against `repo`'s current root graph
    /// (§4.6 "GRT iteration protocol"): a config-only pre-pass if the graph
    /// has any DYNAMIC parameter, feeding its output back into the
    /// parameter scope (step 3), then the full single-rate expansion,
    /// optimization, scheduling, allocation and dispatch.
    pub async fn run_iteration(&mut self, repo: &mut GraphRepository) -> Result<IterationReport> {
        if has_dynamic_param(repo)? {
            let config_sr = expand_config_only(repo)?;
            let config_schedule = schedule(&config_sr, &self.platform, &self.config)?;
            let config_plan = allocate_fifos(&config_sr, &config_schedule)?;
            let pre_report = grt::run_iteration(&self.bus, &mut self.grt_inbox, &config_sr, &config_schedule, &config_plan).await?;
            apply_config_feedback(repo, &config_sr, &pre_report)?;
        }

        let mut sr = expand(repo)?;
        optimize(&mut sr);
        let full_schedule = schedule(&sr, &self.platform, &self.config)?;
        let plan = allocate_fifos(&sr, &full_schedule)?;
        grt::run_iteration(&self.bus, &mut self.grt_inbox, &sr, &full_schedule, &plan).await
    }

    /// Sends `LRT_STOP` to every LRT and awaits their reactor tasks.
    pub async fn shutdown(self) {
        for lrt in self.lrt_ids() {
            self.bus.notify_lrt(lrt, Notification::new(NotificationKind::LrtStop, Sender::Grt));
        }
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

fn has_dynamic_param(repo: &GraphRepository) -> Result<bool> {
    let root = repo.root()?;
    let graph = repo.get(root).ok_or_else(|| Error::Validation("missing root graph".to_string()))?;
    Ok(graph.params().iter().any(|p| p.is_dynamic()))
}

/// A config actor's [`spider_core::Task`] is addressed by the id of the
/// SR-vertex it fires, since `TaskKind::Vertex` carries that id directly;
/// matching by raw id is therefore exact and needs no separate lookup
/// table.
fn task_matches_config_vertex(task: TaskId, vertex: &SrVertex) -> bool {
    task.get() == vertex.id().get()
}

/// Applies a config-only pre-pass's output-parameter reports to the root
/// graph's DYNAMIC parameters, matched by name against the config vertex's
/// kernel string (the `SrVertexKind::Config`/`VertexKind::Config` name-match
/// convention recorded in `DESIGN.md`, since neither kind stores a direct
/// `ParamId`).
fn apply_config_feedback(repo: &mut GraphRepository, sr: &SrGraph, report: &IterationReport) -> Result<()> {
    let root = repo.root()?;
    let graph = repo.get_mut(root).ok_or_else(|| Error::Validation("missing root graph".to_string()))?;

    for (task_id, values) in &report.param_values {
        let Some(value) = values.first().copied() else { continue };
        let Some(vertex) = sr.vertices().find(|v| task_matches_config_vertex(*task_id, v)) else {
            continue;
        };
        let SrVertexKind::Config { kernel } = vertex.kind() else { continue };
        let Some(param_id) = graph.params().get_by_name(kernel).map(|p| p.id()) else {
            continue;
        };
        if let Some(param) = graph.params_mut().get_mut(param_id) {
            if param.is_dynamic() {
                param.set_value(value)?;
            }
        }
    }
    Ok(())
}
