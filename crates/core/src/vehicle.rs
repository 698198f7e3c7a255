// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vehicle registrations offered as compute resources.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

crate::string_id! {
    /// Vehicle identification number, the natural key of a registration.
    pub struct Vin;
}

/// A vehicle offered to the controller for a residency period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRegistration {
    /// Free-form owner text entered by the submitter
    pub owner_id: String,
    /// Registered user that owns the vehicle
    pub vehicle_owner_id: u32,
    pub make: String,
    pub model: String,
    pub year: String,
    pub vin: Vin,
    /// `HH:MM:SS` residency as submitted
    pub residency_time: String,
    pub registered_at: NaiveDateTime,
}
