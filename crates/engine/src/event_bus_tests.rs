// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn every_subscriber_sees_each_event() {
    let bus = EventBus::default();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    assert_eq!(bus.send(Event::VehiclesAssigned { count: 2 }), 2);

    assert_eq!(a.recv().await.unwrap(), Event::VehiclesAssigned { count: 2 });
    assert_eq!(b.recv().await.unwrap(), Event::VehiclesAssigned { count: 2 });
}

#[test]
fn send_without_subscribers_is_harmless() {
    let bus = EventBus::new(4);
    assert_eq!(bus.send(Event::ScheduleUpdated { jobs: 0 }), 0);
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn late_subscriber_misses_earlier_events() {
    let bus = EventBus::default();
    bus.send(Event::ScheduleUpdated { jobs: 1 });
    let mut rx = bus.subscribe();
    bus.send(Event::ScheduleUpdated { jobs: 2 });
    assert_eq!(rx.recv().await.unwrap(), Event::ScheduleUpdated { jobs: 2 });
}
