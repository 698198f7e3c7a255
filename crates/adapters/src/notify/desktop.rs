// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notifications via notify-rust.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Notice, NotifyAdapter, NotifyError};

const APP_NAME: &str = "vcd";

/// Shows notices in the operator's desktop notification area.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        // Without an explicit bundle, mac-notification-sys resolves one via
        // AppleScript on first use, which blocks in a background daemon.
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

fn show(notice: &Notice) {
    let result = notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(&notice.title)
        .body(&notice.body)
        .show();
    match result {
        Ok(_) => debug!(title = %notice.title, "desktop notice shown"),
        Err(e) => warn!(title = %notice.title, error = %e, "desktop notice not shown"),
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    /// Fire and forget: display can block, so it runs on the blocking pool
    /// and the relay never waits for it.
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let notice = notice.clone();
        tokio::task::spawn_blocking(move || show(&notice));
        Ok(())
    }
}
