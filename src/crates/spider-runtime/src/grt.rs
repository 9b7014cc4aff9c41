//! Global run-time: the GRT iteration protocol of §4.6, driving every LRT
//! through a start/dispatch/end/await cycle over one already-scheduled,
//! already-allocated single-rate graph.

use crate::bus::{Bus, GrtEvent, GrtInbox};
use crate::message::{FifoDescriptor, JobMessage, KernelRef, Message, StructuralKernel};
use crate::notification::{Notification, NotificationKind, Sender};
use spider_core::{FifoPlan, PeRef, Schedule, SrEdgeId, SrGraph, SrVertexKind, Task, TaskId, TaskKind};
use spider_types::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Outcome of one full GRT iteration: which tasks reported output
/// parameters and with what values, plus any `KERNEL_RUNTIME_ERROR`
/// failures (§7: non-fatal, logged, iteration continues).
#[derive(Debug, Default)]
pub struct IterationReport {
    pub param_values: HashMap<TaskId, Vec<i64>>,
    pub failures: Vec<crate::message::FailureMessage>,
}

impl IterationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn fifo_descriptor(plan: &FifoPlan, edge: SrEdgeId) -> Option<FifoDescriptor> {
    plan.fifo_for_edge(edge).map(|f| FifoDescriptor { fifo: f.id(), size: f.size(), attribute: f.attribute() })
}

/// Translates one committed [`Task`] into the job message the specification
/// describes (§4.6 "Job message").
pub fn build_job_message(sr: &SrGraph, task: &Task, plan: &FifoPlan) -> Result<JobMessage> {
    let (kernel, inputs, outputs, expected_output_params) = match task.kind() {
        TaskKind::Vertex(vid) => {
            let vertex = sr.vertex(vid).ok_or_else(|| Error::Validation(format!("dispatcher: unknown SR-vertex {}", vid.get())))?;
            let kernel = match vertex.kind() {
                SrVertexKind::Normal { kernel } | SrVertexKind::Config { kernel } => KernelRef::User(kernel.clone()),
                SrVertexKind::Fork => KernelRef::Structural(StructuralKernel::Fork),
                SrVertexKind::Join => KernelRef::Structural(StructuralKernel::Join),
                SrVertexKind::Duplicate => KernelRef::Structural(StructuralKernel::Duplicate),
                SrVertexKind::Head => KernelRef::Structural(StructuralKernel::Head),
                SrVertexKind::Tail => KernelRef::Structural(StructuralKernel::Tail),
                SrVertexKind::Repeat => KernelRef::Structural(StructuralKernel::Repeat),
                SrVertexKind::Init => KernelRef::Structural(StructuralKernel::Init),
                SrVertexKind::End => KernelRef::Structural(StructuralKernel::End),
                SrVertexKind::Send => KernelRef::Structural(StructuralKernel::Send),
                SrVertexKind::Receive => KernelRef::Structural(StructuralKernel::Receive),
            };
            let inputs = vertex.inputs().iter().flatten().filter_map(|e| fifo_descriptor(plan, e)).collect();
            let outputs = vertex.outputs().iter().flatten().filter_map(|e| fifo_descriptor(plan, e)).collect();
            let expected = if vertex.kind().is_config() { 1 } else { 0 };
            (kernel, inputs, outputs, expected)
        }
        TaskKind::Send { edge, .. } => {
            let fifo = fifo_descriptor(plan, edge).ok_or_else(|| Error::Validation("SEND task has no source fifo".to_string()))?;
            (KernelRef::Structural(StructuralKernel::Send), vec![fifo], vec![fifo], 0)
        }
        TaskKind::Receive { edge, .. } => {
            let fifo = fifo_descriptor(plan, edge).ok_or_else(|| Error::Validation("RECEIVE task has no source fifo".to_string()))?;
            (KernelRef::Structural(StructuralKernel::Receive), vec![fifo], vec![fifo], 0)
        }
    };

    Ok(JobMessage {
        task: task.id(),
        exec_index: task.exec_index(),
        kernel,
        params_in: Vec::new(),
        expected_output_params,
        inputs,
        outputs,
        notify: task.notify_set().copied().collect(),
        exec_constraints: task.exec_constraints().to_vec(),
    })
}

/// Runs the four-step GRT iteration protocol (§4.6 "GRT iteration
/// protocol", steps 1/2/4/5 -- step 3's config/re-expand loop lives in
/// `spider_runtime::pipeline`, one layer up, since it needs to mutate the
/// parameter scope between two calls to this function) over one committed
/// schedule, and collects every parameter/failure report the LRTs send
/// back.
pub async fn run_iteration(bus: &Bus, inbox: &mut GrtInbox, sr: &SrGraph, schedule: &Schedule, plan: &FifoPlan) -> Result<IterationReport> {
    let lrts: HashSet<PeRef> = schedule.tasks_in_order().map(Task::mapped_lrt).collect();

    for &lrt in &lrts {
        bus.notify_lrt(lrt, Notification::new(NotificationKind::LrtStartIteration, Sender::Grt));
    }

    for task in schedule.tasks_in_order() {
        let job = build_job_message(sr, task, plan)?;
        bus.send_job(task.mapped_lrt(), Message::Job(job));
        bus.notify_lrt(task.mapped_lrt(), Notification::new(NotificationKind::JobAdd, Sender::Grt));
    }

    for &lrt in &lrts {
        bus.notify_lrt(lrt, Notification::new(NotificationKind::LrtEndIteration, Sender::Grt));
    }

    let mut report = IterationReport::default();
    let mut finished: HashSet<PeRef> = HashSet::new();
    while finished.len() < lrts.len() {
        match inbox.events.recv().await {
            Some(GrtEvent::FinishedIteration(lrt)) => {
                finished.insert(lrt);
            }
            Some(GrtEvent::SentParam(_lrt)) => match inbox.messages.recv().await {
                Some(Message::Param(p)) => {
                    report.param_values.insert(p.task, p.values);
                }
                Some(other) => drain_non_param(&mut report, other),
                None => break,
            },
            None => break,
        }
    }

    while let Ok(message) = inbox.messages.try_recv() {
        drain_non_param(&mut report, message);
    }

    Ok(report)
}

fn drain_non_param(report: &mut IterationReport, message: Message) {
    match message {
        Message::Failure(f) => report.failures.push(f),
        Message::Param(p) => {
            report.param_values.insert(p.task, p.values);
        }
        Message::Job(_) | Message::Trace(_) => {}
    }
}
