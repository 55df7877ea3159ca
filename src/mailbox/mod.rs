//! Comm-activity matching (spec §4.2: "matches with an opposite-direction
//! pending Comm... matching discipline is FIFO per mailbox within one
//! direction").
//!
//! Distinct from the teacher's `mailbox` module (which queues `Message`
//! payloads for actor inboxes): here a mailbox queues *activities* waiting
//! to be paired, one FIFO queue per direction.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::activity::Activity;
use crate::util::MailboxId;

/// One named mailbox's two FIFO queues.
#[derive(Default)]
pub struct Mailbox {
    pending_sends: Mutex<VecDeque<Arc<Activity>>>,
    pending_recvs: Mutex<VecDeque<Arc<Activity>>>,
}

impl Mailbox {
    /// Offer a Send activity. Returns the matched Recv if one was already
    /// waiting, otherwise enqueues the Send. Skips any queued counterpart
    /// that was canceled (e.g. its issuer was killed) in the meantime.
    pub fn offer_send(&self, activity: Arc<Activity>) -> Option<Arc<Activity>> {
        let mut recvs = self.pending_recvs.lock();
        while let Some(recv) = recvs.pop_front() {
            if !recv.state().is_terminal() {
                return Some(recv);
            }
        }
        drop(recvs);
        self.pending_sends.lock().push_back(activity);
        None
    }

    /// Offer a Recv activity. Returns the matched Send if one was already
    /// waiting, otherwise enqueues the Recv. Skips any queued counterpart
    /// that was canceled in the meantime.
    pub fn offer_recv(&self, activity: Arc<Activity>) -> Option<Arc<Activity>> {
        let mut sends = self.pending_sends.lock();
        while let Some(send) = sends.pop_front() {
            if !send.state().is_terminal() {
                return Some(send);
            }
        }
        drop(sends);
        self.pending_recvs.lock().push_back(activity);
        None
    }

    pub fn remove(&self, activity: &Arc<Activity>) {
        self.pending_sends.lock().retain(|a| !Arc::ptr_eq(a, activity));
        self.pending_recvs.lock().retain(|a| !Arc::ptr_eq(a, activity));
    }
}

/// Registry of named mailboxes, created lazily on first use.
#[derive(Default)]
pub struct MailboxRegistry {
    mailboxes: DashMap<MailboxId, Arc<Mailbox>>,
}

impl MailboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, id: &MailboxId) -> Arc<Mailbox> {
        Arc::clone(
            &self
                .mailboxes
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mailbox::default())),
        )
    }
}
