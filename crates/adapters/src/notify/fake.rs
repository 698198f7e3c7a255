// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording notification adapter for tests
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Notice, NotifyAdapter, NotifyError};

#[derive(Default)]
struct Recorded {
    delivered: Vec<Notice>,
    failing: bool,
}

/// Keeps every delivered notice; clones share the same record.
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered notices, oldest first
    pub fn notices(&self) -> Vec<Notice> {
        self.recorded.lock().delivered.clone()
    }

    /// While set, deliveries fail and nothing is recorded
    pub fn fail_sends(&self, fail: bool) {
        self.recorded.lock().failing = fail;
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let mut recorded = self.recorded.lock();
        if recorded.failing {
            return Err(NotifyError::SendFailed(format!(
                "injected failure for {:?}",
                notice.title
            )));
        }
        recorded.delivered.push(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
