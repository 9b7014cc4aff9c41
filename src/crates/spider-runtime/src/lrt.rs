//! Local run-time main loop (§4.6 "LRT main loop"): one `tokio::spawn`ed
//! task per LRT, draining its notification queue and executing ready jobs
//! strictly sequentially (§5 "Within one LRT, jobs execute strictly
//! sequentially in the order received").

use crate::bus::{Bus, GrtEvent, LrtInbox};
use crate::job_stamp::JobStamp;
use crate::kernel::{run_kernel, KernelRegistry};
use crate::message::{FailureMessage, JobMessage, Message, ParamMessage};
use crate::notification::{Notification, NotificationKind, Sender};
use spider_core::PeRef;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Runs one LRT's dispatcher loop to completion: until `LRT_STOP` or its
/// notification channel closes.
pub async fn run(id: PeRef, bus: Arc<Bus>, kernels: Arc<KernelRegistry>, mut inbox: LrtInbox) {
    let mut job_queue: VecDeque<JobMessage> = VecDeque::new();
    let mut stamp = JobStamp::zero();
    let mut peer_stamps: HashMap<PeRef, JobStamp> = HashMap::new();
    let mut repeating = false;

    loop {
        let notification = match inbox.notifications.recv().await {
            Some(n) => n,
            None => break,
        };

        match notification.kind {
            NotificationKind::JobAdd => match inbox.messages.recv().await {
                Some(Message::Job(job)) => job_queue.push_back(job),
                _ => tracing::warn!(lrt = ?id, "JOB_ADD notification with no matching job message"),
            },
            NotificationKind::JobClearQueue | NotificationKind::LrtClearIteration => {
                job_queue.clear();
            }
            NotificationKind::JobUpdateJobstamp => {
                if let (Sender::Lrt(from), Some(value)) = (notification.sender, notification.stamp) {
                    peer_stamps.insert(from, JobStamp(value));
                }
            }
            NotificationKind::LrtStartIteration | NotificationKind::LrtResetIteration => {
                stamp = JobStamp::zero();
                peer_stamps.clear();
            }
            NotificationKind::LrtRepeatIterationEnable => repeating = true,
            NotificationKind::LrtRepeatIterationDisable => repeating = false,
            NotificationKind::LrtStop => {
                tracing::debug!(lrt = ?id, "LRT_STOP received, exiting after the current job");
                drain_ready(id, &bus, &kernels, &mut job_queue, &peer_stamps, &mut stamp);
                break;
            }
            NotificationKind::LrtEndIteration => {
                drain_ready(id, &bus, &kernels, &mut job_queue, &peer_stamps, &mut stamp);
                if repeating {
                    tracing::debug!(lrt = ?id, "repeating iteration, job queue carried over");
                } else {
                    bus.notify_grt(GrtEvent::FinishedIteration(id));
                }
                continue;
            }
            NotificationKind::LrtPause
            | NotificationKind::LrtResume
            | NotificationKind::TraceEvent
            | NotificationKind::JobSentParam
            | NotificationKind::JobBroadcastJobstamp
            | NotificationKind::JobDelayBroadcastJobstamp
            | NotificationKind::LrtFinishedIteration => {
                // Only ever sent LRT -> GRT, or not used by this
                // workspace's dispatcher; nothing for an LRT to act on.
            }
        }

        drain_ready(id, &bus, &kernels, &mut job_queue, &peer_stamps, &mut stamp);
    }
}

/// Executes every job at the front of the queue whose execution
/// constraints are already satisfied, in order, stopping at the first job
/// still waiting on a peer (§5 ordering guarantees i and ii).
fn drain_ready(
    id: PeRef,
    bus: &Bus,
    kernels: &KernelRegistry,
    queue: &mut VecDeque<JobMessage>,
    peer_stamps: &HashMap<PeRef, JobStamp>,
    stamp: &mut JobStamp,
) {
    while let Some(job) = queue.front() {
        let ready = job
            .exec_constraints
            .iter()
            .all(|c| peer_stamps.get(&c.lrt).copied().unwrap_or(JobStamp::zero()).satisfies(c.exec_index));
        if !ready {
            break;
        }
        let job = queue.pop_front().expect("front() just confirmed an entry");
        execute_job(id, bus, kernels, job, stamp);
    }
}

fn execute_job(id: PeRef, bus: &Bus, kernels: &KernelRegistry, job: JobMessage, stamp: &mut JobStamp) {
    tracing::debug!(lrt = ?id, task = job.task.get(), exec_index = job.exec_index, "executing job");
    let task = job.task;
    let notify = job.notify.clone();
    let outcome = run_kernel(&job, kernels);

    *stamp = stamp.next();
    for target in notify {
        bus.notify_lrt(target, Notification::with_stamp(NotificationKind::JobUpdateJobstamp, Sender::Lrt(id), stamp.0));
    }

    match outcome {
        Ok(params_out) if !params_out.is_empty() => {
            bus.send_to_grt(Message::Param(ParamMessage { task, values: params_out }));
            bus.notify_grt(GrtEvent::SentParam(id));
        }
        Ok(_) => {}
        Err(error) => {
            tracing::error!(lrt = ?id, task = task.get(), %error, "kernel reported a runtime error, task skipped");
            bus.send_to_grt(Message::Failure(FailureMessage { task, lrt: id, message: error.to_string() }));
        }
    }
}
