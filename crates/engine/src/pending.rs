// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval-gated queue of submissions.

use parking_lot::Mutex;
use vc_core::{ConnectionId, Payload, PendingRequest, RequestId};

struct Inner {
    next_id: RequestId,
    entries: Vec<PendingRequest>,
}

/// Ordered, thread-safe collection of requests awaiting an operator decision.
///
/// The lock is only ever held for the in-memory mutation itself. A request is
/// visible to [`list`](Self::list) once `enqueue` returns, so enqueue always
/// happens before any approval of the same id.
pub struct PendingQueue {
    inner: Mutex<Inner>,
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: RequestId::FIRST,
                entries: Vec::new(),
            }),
        }
    }

    /// Rebuild a queue from a durable mirror.
    ///
    /// Entries keep their ids; allocation resumes after the largest one.
    pub fn restore(entries: Vec<PendingRequest>) -> Self {
        let next_id = entries
            .iter()
            .map(|r| r.id)
            .max()
            .map_or(RequestId::FIRST, RequestId::next);
        Self {
            inner: Mutex::new(Inner { next_id, entries }),
        }
    }

    /// Append a submission and return its newly allocated id. Never rejects.
    pub fn enqueue(
        &self,
        payload: Payload,
        submitter: impl Into<String>,
        origin: Option<ConnectionId>,
    ) -> RequestId {
        let submitter = submitter.into();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id = id.next();
        inner
            .entries
            .push(PendingRequest::restore(id, payload, submitter, origin));
        id
    }

    /// Insertion-ordered copy of the queue.
    pub fn list(&self) -> Vec<PendingRequest> {
        self.inner.lock().entries.clone()
    }

    /// Take a request out of the queue.
    ///
    /// `None` means the id was never issued or was already handled; of two
    /// racing removals of the same id only one gets the request.
    pub fn remove_by_id(&self, id: RequestId) -> Option<PendingRequest> {
        let mut inner = self.inner.lock();
        let pos = inner.entries.iter().position(|r| r.id == id)?;
        Some(inner.entries.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
