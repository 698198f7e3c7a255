// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registered users, looked up to describe who submitted a request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: u32, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: String::new(),
            roles: Vec::new(),
        }
    }

    /// Text recorded on a pending request to identify its submitter.
    pub fn describe(&self) -> String {
        format!("User ID: {} ({})", self.id, self.full_name)
    }
}
