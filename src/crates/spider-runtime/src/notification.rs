//! Notification kinds exchanged on an LRT's notification queue (§4.6
//! "Notification kinds"), reproduced as a closed enum rather than the
//! original's integer constants.

use spider_core::PeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    LrtStartIteration,
    LrtEndIteration,
    LrtFinishedIteration,
    LrtRepeatIterationEnable,
    LrtRepeatIterationDisable,
    LrtResetIteration,
    LrtClearIteration,
    LrtPause,
    LrtResume,
    LrtStop,
    TraceEvent,
    JobAdd,
    JobClearQueue,
    JobSentParam,
    JobBroadcastJobstamp,
    JobDelayBroadcastJobstamp,
    JobUpdateJobstamp,
}

/// Who sent a notification: the GRT, or a specific LRT. Kept as its own
/// type rather than overloading [`PeRef`] with a sentinel value, since the
/// GRT is "the scheduler-side process/thread" and not necessarily one of
/// the platform's processing elements (§4.6 "Entities").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    Grt,
    Lrt(PeRef),
}

/// One entry on a notification queue. The original carries "sender id and
/// an index into the corresponding message queue where applicable"; since
/// the `tokio::sync::mpsc` transport already preserves per-sender-per-queue
/// order (§5 ordering guarantee iii), that index collapses to "the next
/// message waiting on this channel" and `stamp` is the only scalar payload
/// any kind actually needs: the new job-stamp value carried by
/// `JOB_UPDATE_JOBSTAMP`.
#[derive(Debug, Clone, Copy)]
pub struct Notification {
    pub kind: NotificationKind,
    pub sender: Sender,
    pub stamp: Option<u64>,
}

impl Notification {
    pub fn new(kind: NotificationKind, sender: Sender) -> Self {
        Self { kind, sender, stamp: None }
    }

    pub fn with_stamp(kind: NotificationKind, sender: Sender, stamp: u64) -> Self {
        Self { kind, sender, stamp: Some(stamp) }
    }
}
