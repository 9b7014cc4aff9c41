//! Startup and per-graph runtime configuration (§6).
//!
//! Loading follows the `utils::config` pattern from the wider example pack:
//! env-var overrides with typed parsing, plus whole-file YAML loading via
//! `serde_yaml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mode a graph's runtime loop runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Run a fixed number of iterations.
    Loop,
    /// Run until externally stopped.
    Infinite,
    /// Iteration count controlled by an external loop (e.g. a host app).
    ExternLoop,
}

/// Execution policy: when job messages are pushed to LRTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    /// Push jobs only once every upstream dependency is mapped (safer,
    /// higher latency).
    Delayed,
    /// Push a job as soon as it is mapped, regardless of sibling tasks.
    JitSend,
}

/// Task selection order used by the scheduler (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    /// Order by schedule-level (longest remaining path first).
    List,
    /// Order by topological order only.
    Greedy,
    /// Round-robin across ready tasks.
    RoundRobin,
}

/// PE selection policy used when mapping a single task (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingPolicy {
    /// Minimize `start + exec + comm` across candidate PEs.
    BestFit,
    /// Take the first PE that can host the task.
    FirstFit,
    /// Take the PE with the lowest cumulative load.
    LeastLoaded,
}

/// FIFO allocator backing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocatorType {
    /// One arena per cluster, freed at iteration boundary.
    Arena,
    /// Generic heap allocation (useful under a debug/sanitizer build).
    Generic,
}

/// Runtime configuration for a single graph, as described in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_mode")]
    pub mode: RuntimeMode,
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
    #[serde(default = "default_execution_policy")]
    pub execution_policy: ExecutionPolicy,
    #[serde(default = "default_scheduling_policy")]
    pub scheduling_policy: SchedulingPolicy,
    #[serde(default = "default_mapping_policy")]
    pub mapping_policy: MappingPolicy,
    #[serde(default = "default_allocator_type")]
    pub allocator_type: AllocatorType,
    /// Unpinned by the specification (Open Question #2): accepted but
    /// treated as a no-op extension point by the scheduler.
    #[serde(default)]
    pub adaptive_static_scheduling: bool,
}

fn default_mode() -> RuntimeMode {
    RuntimeMode::Loop
}
fn default_loop_count() -> u32 {
    1
}
fn default_execution_policy() -> ExecutionPolicy {
    ExecutionPolicy::JitSend
}
fn default_scheduling_policy() -> SchedulingPolicy {
    SchedulingPolicy::List
}
fn default_mapping_policy() -> MappingPolicy {
    MappingPolicy::BestFit
}
fn default_allocator_type() -> AllocatorType {
    AllocatorType::Arena
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            loop_count: default_loop_count(),
            execution_policy: default_execution_policy(),
            scheduling_policy: default_scheduling_policy(),
            mapping_policy: default_mapping_policy(),
            allocator_type: default_allocator_type(),
            adaptive_static_scheduling: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Configuration(format!("reading {:?}: {e}", path.as_ref())))?;
        serde_yaml::from_str(&content).map_err(|e| Error::Configuration(format!("parsing runtime config: {e}")))
    }
}

/// Process-wide startup flags (§6 "Startup configuration").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    #[serde(default)]
    pub verbose: bool,
    /// Runner-only mode: no GRT runs locally, this process only serves LRTs.
    #[serde(default)]
    pub standalone: bool,
    /// Cluster index this process serves when `standalone` is set.
    pub standalone_cluster: Option<u32>,
    #[serde(default = "default_general_stack_size")]
    pub general_stack_size_bytes: usize,
    #[serde(default)]
    pub export_srdag: bool,
    #[serde(default)]
    pub export_trace: bool,
    #[serde(default)]
    pub export_gantt: bool,
}

fn default_general_stack_size() -> usize {
    1 << 20
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            standalone: false,
            standalone_cluster: None,
            general_stack_size_bytes: default_general_stack_size(),
            export_srdag: false,
            export_trace: false,
            export_gantt: false,
        }
    }
}

impl StartupConfig {
    /// Overlay environment-variable overrides onto a base configuration,
    /// matching `utils::config::get_env_bool_or`'s "typed env override"
    /// idiom.
    pub fn from_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("SPIDER_VERBOSE") {
            self.verbose = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Ok(v) = std::env::var("SPIDER_STANDALONE_CLUSTER") {
            if let Ok(parsed) = v.parse() {
                self.standalone = true;
                self.standalone_cluster = Some(parsed);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_config_defaults() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.loop_count, 1);
        assert_eq!(cfg.mapping_policy, MappingPolicy::BestFit);
    }

    #[test]
    fn startup_config_env_override_cluster_index() {
        std::env::set_var("SPIDER_STANDALONE_CLUSTER", "3");
        let cfg = StartupConfig::default().from_env_overrides();
        assert!(cfg.standalone);
        assert_eq!(cfg.standalone_cluster, Some(3));
        std::env::remove_var("SPIDER_STANDALONE_CLUSTER");
    }

    #[test]
    fn runtime_config_roundtrips_through_yaml() {
        let cfg = RuntimeConfig::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: RuntimeConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.mode, cfg.mode);
    }
}
