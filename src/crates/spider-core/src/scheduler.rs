//! List scheduler and mapper (§4.4): orders SR-graph vertices into
//! executable tasks, maps each onto a concrete processing element, and
//! synthesizes SEND/RECEIVE pairs across cluster boundaries.
//!
//! Grounded on `original_source/libspider/scheduling/mapper/Mapper.h`
//! (the `MappingResult{mappingPE, startTime, endTime, scheduleCost}` record
//! this module's [`Task`] fields mirror) and
//! `scheduling/schedule/ScheduleJob.h`'s job-state machine, adapted to a
//! single batch call over an already-expanded [`SrGraph`] rather than the
//! original's incremental per-firing push model.

use crate::ids::{SrEdgeId, TaskId};
use crate::srgraph::{SrGraph, SrVertexId, SrVertexKind};
use spider_expr::NoParams;
use spider_platform::{ClusterIx, Platform};
use spider_types::config::{MappingPolicy, RuntimeConfig, SchedulingPolicy};
use spider_types::error::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// A processing element, identified by the cluster it belongs to and its
/// index within that cluster's PE list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeRef {
    pub cluster: ClusterIx,
    pub virtual_ix: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotRunnable,
    Pending,
    Ready,
    Running,
    Skipped,
    Finished,
}

/// What a task wraps: either one SR-vertex firing, or a synthesized
/// cross-cluster transfer half tied to the edge it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Vertex(SrVertexId),
    /// A synthesized cross-cluster transfer half (§4.4 step 3). Unlike
    /// `Vertex`, it has no SR-graph vertex of its own, but it still sits on
    /// a real SR-graph edge — `edge` and `rate` let the FIFO allocator
    /// (§4.5) size its buffer and chain it to that edge's consumer.
    Send { edge: SrEdgeId, rate: i64 },
    Receive { edge: SrEdgeId, rate: i64 },
}

/// One entry of a task's wait set: it may not start until LRT `lrt`'s job
/// stamp reaches at least `exec_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecConstraint {
    pub lrt: PeRef,
    pub exec_index: u32,
}

#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    state: TaskState,
    mapped_pe: PeRef,
    /// The LRT that dispatches this task's job and is awaited for iteration
    /// completion: `mapped_pe`'s own PE if it is itself an LRT, otherwise
    /// its cluster's LRT (a `PeRole::Worker` PE has no reactor of its own).
    mapped_lrt: PeRef,
    start: u64,
    end: u64,
    /// Job stamp this task is assigned on its own LRT's queue (the Nth job
    /// that LRT will run, 0-based).
    exec_index: u32,
    predecessors: Vec<TaskId>,
    exec_constraints: Vec<ExecConstraint>,
    notify_set: HashSet<PeRef>,
}

impl Task {
    pub fn id(&self) -> TaskId {
        self.id
    }
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
    pub fn state(&self) -> TaskState {
        self.state
    }
    pub fn mapped_pe(&self) -> PeRef {
        self.mapped_pe
    }
    pub fn mapped_lrt(&self) -> PeRef {
        self.mapped_lrt
    }
    pub fn start(&self) -> u64 {
        self.start
    }
    pub fn end(&self) -> u64 {
        self.end
    }
    pub fn exec_index(&self) -> u32 {
        self.exec_index
    }
    pub fn predecessors(&self) -> &[TaskId] {
        &self.predecessors
    }
    pub fn exec_constraints(&self) -> &[ExecConstraint] {
        &self.exec_constraints
    }
    pub fn notify_set(&self) -> impl Iterator<Item = &PeRef> {
        self.notify_set.iter()
    }
}

#[derive(Debug, Clone, Default)]
struct PeStatsAcc {
    end_time: u64,
    busy: u64,
    job_count: u32,
}

/// Per-PE summary for diagnostics and the ROUND_ROBIN/LEAST_LOADED
/// policies.
#[derive(Debug, Clone, Copy)]
pub struct PeStats {
    pub end_time: u64,
    pub busy_time: u64,
    pub idle_time: u64,
    pub job_count: u32,
}

/// The committed schedule: every task, in commit order, plus per-PE
/// statistics.
#[derive(Debug, Default)]
pub struct Schedule {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    vertex_task: HashMap<SrVertexId, TaskId>,
    pe_stats: HashMap<PeRef, PeStatsAcc>,
    /// Per-LRT job-stream position, separate from `pe_stats`'s per-PE
    /// counters: several worker PEs in a cluster share one LRT reactor and
    /// therefore one job stamp sequence, so a task's `exec_index` (what
    /// `JobStamp`/`ExecConstraint` synchronize on) must count jobs per LRT,
    /// not per the PE the task happens to execute on.
    lrt_job_counts: HashMap<PeRef, u32>,
    next_id: u32,
}

impl Schedule {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn tasks_in_order(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().map(move |id| &self.tasks[id])
    }

    pub fn task_for_vertex(&self, vertex: SrVertexId) -> Option<TaskId> {
        self.vertex_task.get(&vertex).copied()
    }

    pub fn pe_stats(&self, pe: PeRef) -> PeStats {
        let acc = self.pe_stats.get(&pe).cloned().unwrap_or_default();
        PeStats {
            end_time: acc.end_time,
            busy_time: acc.busy,
            idle_time: acc.end_time.saturating_sub(acc.busy),
            job_count: acc.job_count,
        }
    }

    fn alloc_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn next_lrt_exec_index(&mut self, lrt: PeRef) -> u32 {
        let counter = self.lrt_job_counts.entry(lrt).or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    }
}

struct Candidate {
    pe: PeRef,
    start: u64,
    exec_time: u64,
    comm_cost: u64,
}

impl Candidate {
    fn cost(&self) -> u64 {
        self.start.saturating_add(self.exec_time).saturating_add(self.comm_cost)
    }

    fn end(&self) -> u64 {
        self.start.saturating_add(self.exec_time)
    }
}

/// Computes the schedule-level (§4.4 "Schedule level (LIST)") of every
/// vertex from a topological order, and returns that order alongside it.
/// A vertex with no PE anywhere able to host its kernel gets the sentinel
/// `i64::MIN`, sinking it to the tail of any level-ordered queue.
fn levels_and_topo_order(sr: &SrGraph, platform: &Platform) -> (Vec<SrVertexId>, HashMap<SrVertexId, i64>) {
    let mut in_degree: HashMap<SrVertexId, usize> = HashMap::new();
    for v in sr.vertices() {
        in_degree.entry(v.id()).or_insert(0);
        for s in sr.successors(v.id()) {
            *in_degree.entry(s).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<SrVertexId> = in_degree.iter().filter(|(_, d)| **d == 0).map(|(id, _)| *id).collect();
    let mut order = Vec::with_capacity(in_degree.len());
    let mut remaining = in_degree.clone();
    while let Some(v) = queue.pop_front() {
        order.push(v);
        for s in sr.successors(v) {
            let d = remaining.get_mut(&s).unwrap();
            *d -= 1;
            if *d == 0 {
                queue.push_back(s);
            }
        }
    }

    let min_exec_time = |vid: SrVertexId| -> Option<i64> {
        let v = sr.vertex(vid)?;
        let mut best: Option<i64> = None;
        for cluster in platform.clusters() {
            for pe in cluster.pes() {
                if !pe.is_enabled() || !v.runtime_info().accepts(pe.hardware_type()) {
                    continue;
                }
                let t = v.runtime_info().timing(pe.hardware_type()).evaluate(&NoParams).unwrap_or(1);
                best = Some(best.map_or(t, |b| b.min(t)));
            }
        }
        best
    };

    let mut levels: HashMap<SrVertexId, i64> = HashMap::new();
    for &v in &order {
        let base = sr
            .predecessors(v)
            .map(|p| levels.get(&p).copied().unwrap_or(0).saturating_add(min_exec_time(p).unwrap_or(0)))
            .max()
            .unwrap_or(0);
        let level = if min_exec_time(v).is_none() { i64::MIN } else { base };
        levels.insert(v, level);
    }
    (order, levels)
}

/// Runs the full scheduler/mapper pipeline over an already-optimized SR
/// graph, producing a committed [`Schedule`].
pub fn schedule(sr: &SrGraph, platform: &Platform, config: &RuntimeConfig) -> Result<Schedule> {
    let (topo_order, levels) = levels_and_topo_order(sr, platform);

    let mut result = Schedule::default();
    let mut in_degree: HashMap<SrVertexId, usize> = HashMap::new();
    for v in sr.vertices() {
        in_degree.entry(v.id()).or_insert(0);
        for s in sr.successors(v.id()) {
            *in_degree.entry(s).or_insert(0) += 1;
        }
    }
    let mut ready: Vec<SrVertexId> = in_degree.iter().filter(|(_, d)| **d == 0).map(|(id, _)| *id).collect();
    ready.sort_by_key(|id| id.get());
    let arrival_order: HashMap<SrVertexId, usize> = topo_order.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let mut round_robin_counter = 0usize;

    while !ready.is_empty() {
        let pick_ix = match config.scheduling_policy {
            SchedulingPolicy::List => ready
                .iter()
                .enumerate()
                .max_by_key(|(_, v)| (levels[v], std::cmp::Reverse(v.get())))
                .map(|(i, _)| i)
                .unwrap(),
            SchedulingPolicy::Greedy => ready
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| arrival_order.get(v).copied().unwrap_or(usize::MAX))
                .map(|(i, _)| i)
                .unwrap(),
            SchedulingPolicy::RoundRobin => {
                let ix = round_robin_counter % ready.len();
                round_robin_counter += 1;
                ix
            }
        };
        let vid = ready.remove(pick_ix);

        map_vertex(sr, platform, config, vid, &mut result)?;

        for s in sr.successors(vid) {
            let d = in_degree.get_mut(&s).unwrap();
            *d -= 1;
            if *d == 0 {
                ready.push(s);
            }
        }
    }

    synchronization_plan(&mut result);
    Ok(result)
}

/// Resolves the LRT that dispatches jobs for `pe`: `pe` itself if it is an
/// LRT, otherwise its cluster's LRT, the same lookup the SEND/RECEIVE
/// synthesis path below uses.
fn resolve_lrt(platform: &Platform, pe: PeRef) -> Result<PeRef> {
    platform
        .cluster(pe.cluster)
        .and_then(|c| c.lrt())
        .map(|lrt_pe| PeRef { cluster: pe.cluster, virtual_ix: lrt_pe.virtual_ix() })
        .ok_or_else(|| Error::Validation(format!("cluster {} has no LRT to dispatch through", pe.cluster.0)))
}

fn candidate_pes<'a>(platform: &'a Platform, runtime_info: &'a crate::srgraph::RuntimeInfo) -> impl Iterator<Item = PeRef> + 'a {
    platform.clusters().iter().flat_map(move |c| {
        c.pes().iter().filter(move |pe| pe.is_enabled() && runtime_info.accepts(pe.hardware_type())).map(move |pe| PeRef {
            cluster: c.ix(),
            virtual_ix: pe.virtual_ix(),
        })
    })
}

fn map_vertex(sr: &SrGraph, platform: &Platform, config: &RuntimeConfig, vid: SrVertexId, result: &mut Schedule) -> Result<()> {
    let vertex = sr.vertex(vid).ok_or_else(|| Error::Validation(format!("scheduler: unknown SR-vertex {}", vid.get())))?;

    // Collect predecessor tasks (one per input edge, in port order) along
    // with the rate flowing over that edge. A cleared port slot (an edge
    // the optimizer removed) is skipped rather than unwrapped, the same way
    // `SrGraph::predecessors`/`successors` resolve through `sr.edge(...)`.
    let mut pred_tasks: Vec<(TaskId, i64, SrEdgeId)> = Vec::new();
    for edge_id in vertex.inputs().iter().flatten() {
        let Some(edge) = sr.edge(edge_id) else { continue };
        let pred_vertex = edge.source().vertex;
        let pred_task_id = result
            .task_for_vertex(pred_vertex)
            .ok_or_else(|| Error::Validation(format!("scheduler: predecessor of {} not yet scheduled", vid.get())))?;
        pred_tasks.push((pred_task_id, edge.rate(), edge_id));
    }

    let earliest = pred_tasks.iter().map(|(t, ..)| result.task(*t).unwrap().end()).max().unwrap_or(0);

    let mut best: Option<Candidate> = None;
    for pe in candidate_pes(platform, vertex.runtime_info()) {
        let pe_stats = result.pe_stats.entry(pe).or_default();
        let start_on_q = earliest.max(pe_stats.end_time);
        let hw_type = platform
            .cluster(pe.cluster)
            .and_then(|c| c.pes().iter().find(|p| p.virtual_ix() == pe.virtual_ix))
            .map(|p| p.hardware_type())
            .unwrap_or(0);
        let exec_time = vertex.runtime_info().timing(hw_type).evaluate(&NoParams).unwrap_or(1).max(0) as u64;
        let mut comm_cost = 0u64;
        let mut feasible = true;
        for (pred_id, rate, _) in &pred_tasks {
            let pred_cluster = result.task(*pred_id).unwrap().mapped_pe().cluster;
            if pred_cluster == pe.cluster {
                continue;
            }
            match platform.data_communication_cost(pred_cluster, pe.cluster, (*rate).max(0) as u64) {
                Ok(c) => comm_cost = comm_cost.saturating_add(c),
                Err(_) => {
                    feasible = false;
                    break;
                }
            }
        }
        if !feasible {
            continue;
        }
        let candidate = Candidate {
            pe,
            start: start_on_q,
            exec_time,
            comm_cost,
        };
        best = Some(match (best, config.mapping_policy) {
            (None, _) => candidate,
            (Some(b), MappingPolicy::FirstFit) => b,
            (Some(b), MappingPolicy::BestFit) => {
                if candidate.cost() < b.cost() {
                    candidate
                } else {
                    b
                }
            }
            (Some(b), MappingPolicy::LeastLoaded) => {
                let b_load = result.pe_stats(b.pe).job_count;
                let c_load = result.pe_stats(candidate.pe).job_count;
                if c_load < b_load {
                    candidate
                } else {
                    b
                }
            }
        });
        if matches!(config.mapping_policy, MappingPolicy::FirstFit) && best.is_some() {
            break;
        }
    }

    let winner = best.ok_or_else(|| Error::UnmappableTask { task: vertex_label(sr, vid) })?;

    // Insert SEND/RECEIVE pairs for every predecessor mapped to a
    // different cluster than the winning PE.
    let mut final_preds = Vec::with_capacity(pred_tasks.len());
    for (pred_id, rate, edge_id) in pred_tasks {
        let pred_cluster = result.task(pred_id).unwrap().mapped_pe().cluster;
        if pred_cluster == winner.pe.cluster {
            final_preds.push(pred_id);
            continue;
        }
        let receive_id = insert_transfer_pair(sr, platform, result, pred_id, pred_cluster, winner.pe.cluster, rate, edge_id)?;
        final_preds.push(receive_id);
    }

    let lrt = resolve_lrt(platform, winner.pe)?;

    let task_id = result.alloc_id();
    let exec_index = result.next_lrt_exec_index(lrt);
    let pe_stats = result.pe_stats.entry(winner.pe).or_default();
    pe_stats.job_count += 1;
    pe_stats.busy = pe_stats.busy.saturating_add(winner.exec_time);
    pe_stats.end_time = winner.end();

    let task = Task {
        id: task_id,
        kind: TaskKind::Vertex(vid),
        state: TaskState::Finished,
        mapped_pe: winner.pe,
        mapped_lrt: lrt,
        start: winner.start,
        end: winner.end(),
        exec_index,
        predecessors: final_preds,
        exec_constraints: Vec::new(),
        notify_set: HashSet::new(),
    };
    result.tasks.insert(task_id, task);
    result.order.push(task_id);
    result.vertex_task.insert(vid, task_id);
    Ok(())
}

fn vertex_label(sr: &SrGraph, vid: SrVertexId) -> String {
    sr.vertex(vid).map(|v| v.name().to_string()).unwrap_or_else(|| vid.get().to_string())
}

/// Synthesizes a SEND task on `source_cluster` and a RECEIVE task on
/// `dest_cluster`, chaining SEND after the original predecessor and
/// returning the RECEIVE's task id as the new predecessor edge (§4.4
/// step 3).
fn insert_transfer_pair(
    _sr: &SrGraph,
    platform: &Platform,
    result: &mut Schedule,
    predecessor: TaskId,
    source_cluster: ClusterIx,
    dest_cluster: ClusterIx,
    rate: i64,
    edge: SrEdgeId,
) -> Result<TaskId> {
    let bytes = rate.max(0) as u64;
    let (send_cost, receive_cost) = platform.data_communication_costs(source_cluster, dest_cluster, bytes)?;

    let source_lrt = platform
        .cluster(source_cluster)
        .and_then(|c| c.lrt())
        .map(|pe| PeRef { cluster: source_cluster, virtual_ix: pe.virtual_ix() })
        .ok_or_else(|| Error::Validation(format!("cluster {} has no LRT to host a SEND task", source_cluster.0)))?;
    let dest_lrt = platform
        .cluster(dest_cluster)
        .and_then(|c| c.lrt())
        .map(|pe| PeRef { cluster: dest_cluster, virtual_ix: pe.virtual_ix() })
        .ok_or_else(|| Error::Validation(format!("cluster {} has no LRT to host a RECEIVE task", dest_cluster.0)))?;

    let pred_end = result.task(predecessor).unwrap().end();

    let send_id = result.alloc_id();
    let send_exec_index = result.next_lrt_exec_index(source_lrt);
    let send_stats = result.pe_stats.entry(source_lrt).or_default();
    let send_start = pred_end.max(send_stats.end_time);
    let send_end = send_start.saturating_add(send_cost);
    send_stats.end_time = send_end;
    send_stats.busy = send_stats.busy.saturating_add(send_cost);
    send_stats.job_count += 1;
    result.tasks.insert(
        send_id,
        Task {
            id: send_id,
            kind: TaskKind::Send { edge, rate },
            state: TaskState::Finished,
            mapped_pe: source_lrt,
            mapped_lrt: source_lrt,
            start: send_start,
            end: send_end,
            exec_index: send_exec_index,
            predecessors: vec![predecessor],
            exec_constraints: Vec::new(),
            notify_set: HashSet::new(),
        },
    );
    result.order.push(send_id);

    let receive_id = result.alloc_id();
    let recv_exec_index = result.next_lrt_exec_index(dest_lrt);
    let recv_stats = result.pe_stats.entry(dest_lrt).or_default();
    let recv_start = send_end.max(recv_stats.end_time);
    let recv_end = recv_start.saturating_add(receive_cost);
    recv_stats.end_time = recv_end;
    recv_stats.busy = recv_stats.busy.saturating_add(receive_cost);
    recv_stats.job_count += 1;
    result.tasks.insert(
        receive_id,
        Task {
            id: receive_id,
            kind: TaskKind::Receive { edge, rate },
            state: TaskState::Finished,
            mapped_pe: dest_lrt,
            mapped_lrt: dest_lrt,
            start: recv_start,
            end: recv_end,
            exec_index: recv_exec_index,
            predecessors: vec![send_id],
            exec_constraints: Vec::new(),
            notify_set: HashSet::new(),
        },
    );
    result.order.push(receive_id);
    Ok(receive_id)
}

/// Builds the wait set for every task (§4.4 "Synchronization plan"), then
/// derives the notify set as its exact inverse: whenever task `t` is told
/// to wait on predecessor `p`'s exec index, `p` is told to notify `t`'s
/// LRT. This guarantees every wait is matched by exactly one notify, the
/// "notification closure" property, by construction rather than by the
/// redundancy-elimination heuristic the rule-of-thumb description implies.
///
/// Grouped by `mapped_lrt`, not `mapped_pe`: waits and notifications travel
/// over the bus between reactors, and only an LRT has one.
fn synchronization_plan(schedule: &mut Schedule) {
    let order = schedule.order.clone();
    let mut constraints: HashMap<TaskId, Vec<ExecConstraint>> = HashMap::new();
    for &tid in &order {
        let task = &schedule.tasks[&tid];
        let mut by_lrt: HashMap<PeRef, (TaskId, u32)> = HashMap::new();
        for &pred_id in &task.predecessors {
            let pred = &schedule.tasks[&pred_id];
            if pred.mapped_lrt == task.mapped_lrt {
                continue;
            }
            by_lrt
                .entry(pred.mapped_lrt)
                .and_modify(|(best_id, best_exec)| {
                    if pred.exec_index > *best_exec {
                        *best_id = pred_id;
                        *best_exec = pred.exec_index;
                    }
                })
                .or_insert((pred_id, pred.exec_index));
        }
        constraints.insert(
            tid,
            by_lrt
                .into_iter()
                .map(|(lrt, (_, exec_index))| ExecConstraint { lrt, exec_index })
                .collect(),
        );
        let referenced: Vec<TaskId> = schedule.tasks[&tid]
            .predecessors
            .iter()
            .copied()
            .filter(|p| {
                let pred = &schedule.tasks[p];
                pred.mapped_lrt != task.mapped_lrt
            })
            .collect();
        for pred_id in referenced {
            let lrt = task.mapped_lrt;
            schedule.tasks.get_mut(&pred_id).unwrap().notify_set.insert(lrt);
        }
    }
    for (tid, c) in constraints {
        schedule.tasks.get_mut(&tid).unwrap().exec_constraints = c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srgraph::{RuntimeInfo, SrGraph, SrVertexKind};
    use spider_expr::Expression;
    use spider_platform::{Cluster, Pe, PeRole, Platform};

    fn single_cluster_platform(pe_count: usize) -> Platform {
        let mut platform = Platform::new();
        let mut cluster = Cluster::new(ClusterIx(0), "c0", 1 << 20);
        cluster.add_pe(Pe::new(0, 0, 0, "lrt", PeRole::Lrt));
        for i in 0..pe_count {
            cluster.add_pe(Pe::new(i + 1, 0, (i + 1) as u32, format!("pe{i}"), PeRole::Worker));
        }
        platform.add_cluster(cluster);
        platform
    }

    #[test]
    fn chain_schedules_in_topological_order() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| {
            crate::srgraph::SrVertex::new(id, "a", SrVertexKind::Normal { kernel: "a".into() })
                .with_runtime_info(RuntimeInfo::new().with_timing(0, Expression::from_value(2)))
        });
        let b = sr.add_vertex_with(|id| {
            crate::srgraph::SrVertex::new(id, "b", SrVertexKind::Normal { kernel: "b".into() })
                .with_runtime_info(RuntimeInfo::new().with_timing(0, Expression::from_value(2)))
        });
        sr.connect(a, b, 4);

        let platform = single_cluster_platform(1);
        let config = RuntimeConfig::default();
        let schedule = schedule(&sr, &platform, &config).unwrap();

        let task_a = schedule.task(schedule.task_for_vertex(a).unwrap()).unwrap();
        let task_b = schedule.task(schedule.task_for_vertex(b).unwrap()).unwrap();
        assert!(task_b.start() >= task_a.end());
    }

    #[test]
    fn unmappable_task_is_an_error() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex_with(|id| {
            crate::srgraph::SrVertex::new(id, "a", SrVertexKind::Normal { kernel: "a".into() })
                .with_runtime_info(RuntimeInfo::new().restricted_to([99]))
        });
        let _ = a;

        let platform = single_cluster_platform(1);
        let config = RuntimeConfig::default();
        let err = schedule(&sr, &platform, &config).unwrap_err();
        assert!(matches!(err, Error::UnmappableTask { .. }));
    }

    #[test]
    fn wait_set_is_mirrored_by_a_notify_set() {
        let mut sr = SrGraph::new();
        let a = sr.add_vertex("a", SrVertexKind::Normal { kernel: "a".into() });
        let b = sr.add_vertex("b", SrVertexKind::Normal { kernel: "b".into() });
        sr.connect(a, b, 4);

        let mut platform = Platform::new();
        let mut c0 = Cluster::new(ClusterIx(0), "c0", 1024);
        c0.add_pe(Pe::new(0, 0, 0, "lrt0", PeRole::Lrt));
        platform.add_cluster(c0);
        let mut c1 = Cluster::new(ClusterIx(1), "c1", 1024);
        c1.add_pe(Pe::new(0, 0, 0, "lrt1", PeRole::Lrt));
        platform.add_cluster(c1);
        platform.add_inter_cluster_bus(
            ClusterIx(0),
            ClusterIx(1),
            spider_platform::InterClusterBus {
                a_to_b: spider_platform::MemoryBus::uniform(spider_platform::ZeroCost),
                b_to_a: spider_platform::MemoryBus::uniform(spider_platform::ZeroCost),
            },
        );

        let config = RuntimeConfig::default();
        let schedule = schedule(&sr, &platform, &config).unwrap();
        for t in schedule.tasks_in_order() {
            for c in t.exec_constraints() {
                let referenced = schedule.tasks.values().find(|o| o.mapped_pe == c.lrt && o.exec_index == c.exec_index).unwrap();
                assert!(referenced.notify_set.contains(&t.mapped_pe));
            }
        }
    }
}
