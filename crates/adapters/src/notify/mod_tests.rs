// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    desktop = { "desktop", NotifyMode::Desktop },
    upper = { "DESKTOP", NotifyMode::Desktop },
    none = { "none", NotifyMode::None },
    off = { " off ", NotifyMode::None },
)]
fn notify_mode_parses(text: &str, expected: NotifyMode) {
    assert_eq!(text.parse::<NotifyMode>().unwrap(), expected);
}

#[test]
fn notify_mode_rejects_unknown() {
    assert!("email".parse::<NotifyMode>().is_err());
}

#[test]
fn notify_mode_display_round_trips() {
    for mode in [NotifyMode::Desktop, NotifyMode::None] {
        assert_eq!(mode.to_string().parse::<NotifyMode>().unwrap(), mode);
    }
}

#[tokio::test]
async fn disabled_notifier_accepts_everything() {
    let notifier = Notifier::for_mode(NotifyMode::None);
    assert!(matches!(notifier, Notifier::Disabled));
    notifier
        .notify(&Notice::new("title", "body"))
        .await
        .unwrap();
}
