// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory image of everything a store holds

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vc_core::{Job, PendingRequest, User, VehicleRegistration};

use crate::{JobStates, Schedule, StoreError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreState {
    /// Jobs in insertion order
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub vehicles: Vec<VehicleRegistration>,
    #[serde(default)]
    pub users: HashMap<u32, User>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub job_states: JobStates,
    #[serde(default)]
    pub pending: Vec<PendingRequest>,
}

impl StoreState {
    pub fn add_job(&mut self, job: &Job) -> Result<(), StoreError> {
        if self.jobs.iter().any(|j| j.id == job.id) {
            return Err(StoreError::DuplicateJob(job.id.clone()));
        }
        self.jobs.push(job.clone());
        Ok(())
    }

    pub fn update_job(&mut self, job: &Job) -> Result<(), StoreError> {
        let slot = self
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or_else(|| StoreError::JobNotFound(job.id.clone()))?;
        *slot = job.clone();
        Ok(())
    }

    pub fn add_vehicle(&mut self, vehicle: &VehicleRegistration) -> Result<(), StoreError> {
        if self.vehicles.iter().any(|v| v.vin == vehicle.vin) {
            return Err(StoreError::DuplicateVehicle(vehicle.vin.clone()));
        }
        self.vehicles.push(vehicle.clone());
        Ok(())
    }

    /// Insert or replace a user record.
    pub fn add_user(&mut self, user: &User) {
        self.users.insert(user.id, user.clone());
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
