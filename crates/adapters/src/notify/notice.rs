// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing text for controller events.

use vc_core::{Event, RequestKind};

/// A title and body ready to show to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// The notice an operator should see for `event`, if any.
    ///
    /// Only events that need a decision or signal lost work are surfaced.
    pub fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::RequestSubmitted {
                request_id,
                kind,
                subject,
                submitter,
            } => {
                let title = match kind {
                    RequestKind::Job => "New job request",
                    RequestKind::Vehicle => "New vehicle registration",
                };
                Some(Notice::new(
                    title,
                    format!("#{request_id} {subject} from {submitter} awaits approval"),
                ))
            }
            Event::ApprovalFailed {
                request_id,
                subject,
                error,
            } => Some(Notice::new(
                "Approval failed",
                format!("#{request_id} {subject} was not saved: {error}"),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "notice_tests.rs"]
mod tests;
