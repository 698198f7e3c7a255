// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

crate::string_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn string_id_displays_and_compares_with_str() {
    let id = TestId::new("hello");
    assert_eq!(id.to_string(), "hello");
    assert_eq!(id, "hello");
    assert_eq!(id.as_str(), "hello");
}

#[test]
fn string_id_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));
    let owned = TestId::from("k");
    let borrowed: &str = owned.borrow();
    assert_eq!(borrowed, "k");
}

#[test]
fn string_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&TestId::new("J-7")).unwrap();
    assert_eq!(json, "\"J-7\"");
}

#[test]
fn request_id_orders_numerically() {
    assert!(RequestId(2) < RequestId(10));
    assert_eq!(RequestId::FIRST.next(), RequestId(2));
}

#[test]
fn request_id_parses_trimmed_text() {
    assert_eq!(" 42 ".parse::<RequestId>().unwrap(), RequestId(42));
    assert!("abc".parse::<RequestId>().is_err());
}
