//! The per-LRT channel pair plus the GRT's aggregated inbox (§4.6
//! "Channels"), built on `tokio::sync::mpsc`.
//!
//! Grounded on the teacher's versioned-channel plumbing in
//! `langgraph-checkpoint`, adapted from a single shared-state channel to the
//! notification-queue/message-queue pair the specification describes. Each
//! LRT's two queues are single-producer (GRT) / single-consumer (that LRT),
//! so the "FIFO per sender per queue" guarantee (§5 ordering iii) holds
//! without extra bookkeeping; the GRT's inbox aggregates every LRT's sends
//! into one multi-producer channel, since only the GRT needs to hear from
//! all of them at once.

use crate::message::Message;
use crate::notification::Notification;
use spider_core::PeRef;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// What the GRT hears about an LRT's progress: `FinishedIteration`
/// corresponds to `LRT_FINISHED_ITERATION`, `SentParam` to `JOB_SENT_PARAM`
/// (§4.6 notification kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrtEvent {
    FinishedIteration(PeRef),
    SentParam(PeRef),
}

pub struct LrtInbox {
    pub notifications: mpsc::UnboundedReceiver<Notification>,
    pub messages: mpsc::UnboundedReceiver<Message>,
}

pub struct GrtInbox {
    pub events: mpsc::UnboundedReceiver<GrtEvent>,
    pub messages: mpsc::UnboundedReceiver<Message>,
}

/// Shared handle every LRT task and the GRT task hold an `Arc` of, used to
/// reach any other endpoint.
pub struct Bus {
    lrt_notifications: HashMap<PeRef, mpsc::UnboundedSender<Notification>>,
    lrt_messages: HashMap<PeRef, mpsc::UnboundedSender<Message>>,
    grt_events: mpsc::UnboundedSender<GrtEvent>,
    grt_messages: mpsc::UnboundedSender<Message>,
}

impl Bus {
    /// Builds a bus wired for exactly `lrts`, plus the inbox each of those
    /// LRTs and the GRT should be driven with.
    pub fn new(lrts: impl IntoIterator<Item = PeRef>) -> (Self, HashMap<PeRef, LrtInbox>, GrtInbox) {
        let mut lrt_notifications = HashMap::new();
        let mut lrt_messages = HashMap::new();
        let mut inboxes = HashMap::new();
        for lrt in lrts {
            let (notif_tx, notif_rx) = mpsc::unbounded_channel();
            let (msg_tx, msg_rx) = mpsc::unbounded_channel();
            lrt_notifications.insert(lrt, notif_tx);
            lrt_messages.insert(lrt, msg_tx);
            inboxes.insert(lrt, LrtInbox { notifications: notif_rx, messages: msg_rx });
        }
        let (grt_event_tx, grt_event_rx) = mpsc::unbounded_channel();
        let (grt_msg_tx, grt_msg_rx) = mpsc::unbounded_channel();
        let bus = Self {
            lrt_notifications,
            lrt_messages,
            grt_events: grt_event_tx,
            grt_messages: grt_msg_tx,
        };
        (bus, inboxes, GrtInbox { events: grt_event_rx, messages: grt_msg_rx })
    }

    pub fn notify_lrt(&self, target: PeRef, notification: Notification) {
        match self.lrt_notifications.get(&target) {
            Some(tx) => {
                let _ = tx.send(notification);
            }
            None => tracing::warn!(?target, "notification addressed to an LRT not registered on this bus"),
        }
    }

    pub fn send_job(&self, target: PeRef, message: Message) {
        match self.lrt_messages.get(&target) {
            Some(tx) => {
                let _ = tx.send(message);
            }
            None => tracing::warn!(?target, "message addressed to an LRT not registered on this bus"),
        }
    }

    pub fn notify_grt(&self, event: GrtEvent) {
        let _ = self.grt_events.send(event);
    }

    pub fn send_to_grt(&self, message: Message) {
        let _ = self.grt_messages.send(message);
    }

    pub fn lrt_ids(&self) -> impl Iterator<Item = PeRef> + '_ {
        self.lrt_notifications.keys().copied()
    }
}
