// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use vc_core::{parse_timestamp, Job};

fn job_payload(id: &str) -> Payload {
    Payload::Job(Job::new(
        id,
        "encode",
        1,
        "00:10:00",
        "2025-02-01",
        parse_timestamp("2025-01-01 09:00:00").unwrap(),
    ))
}

#[test]
fn ids_start_at_one_and_increase() {
    let queue = PendingQueue::new();
    let a = queue.enqueue(job_payload("J1"), "Unknown", None);
    let b = queue.enqueue(job_payload("J2"), "Unknown", None);
    assert_eq!(a, RequestId(1));
    assert_eq!(b, RequestId(2));
}

#[test]
fn list_preserves_insertion_order() {
    let queue = PendingQueue::new();
    for id in ["J3", "J1", "J2"] {
        queue.enqueue(job_payload(id), "Unknown", None);
    }
    let subjects: Vec<String> = queue
        .list()
        .iter()
        .map(|r| r.subject().to_string())
        .collect();
    assert_eq!(subjects, vec!["job J3", "job J1", "job J2"]);
}

#[test]
fn removal_is_single_shot() {
    let queue = PendingQueue::new();
    let id = queue.enqueue(job_payload("J1"), "Unknown", None);

    assert!(queue.remove_by_id(id).is_some());
    assert!(queue.remove_by_id(id).is_none());
    assert!(queue.is_empty());
}

#[test]
fn ids_are_never_reused_after_removal() {
    let queue = PendingQueue::new();
    let first = queue.enqueue(job_payload("J1"), "Unknown", None);
    queue.remove_by_id(first);
    let second = queue.enqueue(job_payload("J2"), "Unknown", None);
    assert!(second > first);
}

#[test]
fn restore_resumes_after_largest_id() {
    let entries = vec![
        PendingRequest::new(RequestId(4), job_payload("J1"), "Unknown"),
        PendingRequest::new(RequestId(9), job_payload("J2"), "Unknown"),
    ];
    let queue = PendingQueue::restore(entries);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.enqueue(job_payload("J3"), "Unknown", None), RequestId(10));
}

#[test]
fn restore_empty_starts_fresh() {
    let queue = PendingQueue::restore(Vec::new());
    assert_eq!(queue.enqueue(job_payload("J1"), "Unknown", None), RequestId::FIRST);
}

#[test]
fn concurrent_enqueues_get_unique_increasing_ids() {
    let queue = Arc::new(PendingQueue::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                (0..25)
                    .map(|i| queue.enqueue(job_payload(&format!("J{t}-{i}")), "Unknown", None))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<RequestId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);

    let listed: Vec<RequestId> = queue.list().iter().map(|r| r.id).collect();
    assert!(listed.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn racing_removals_only_one_wins() {
    let queue = Arc::new(PendingQueue::new());
    let id = queue.enqueue(job_payload("J1"), "Unknown", None);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.remove_by_id(id).is_some())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}
