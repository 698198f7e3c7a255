// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volatile store, used for tests and for running without a state directory.

use std::sync::Arc;

use parking_lot::Mutex;
use vc_core::{Job, PendingRequest, User, VehicleRegistration};

#[cfg(any(test, feature = "test-support"))]
use vc_core::{JobId, JobState};

use crate::{JobStates, Schedule, Store, StoreError, StoreState};

#[derive(Default)]
struct Inner {
    state: StoreState,
    #[cfg(any(test, feature = "test-support"))]
    fail_writes: bool,
    #[cfg(any(test, feature = "test-support"))]
    job_updates: Vec<(JobId, JobState)>,
}

/// Store that keeps everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub fn state(&self) -> StoreState {
        self.inner.lock().state.clone()
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check_writable(inner: &Inner) -> Result<(), StoreError> {
        if inner.fail_writes {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check_writable(_inner: &Inner) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryStore {
    /// Make job/vehicle writes fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Every `update_job` call observed, in order.
    pub fn job_updates(&self) -> Vec<(JobId, JobState)> {
        self.inner.lock().job_updates.clone()
    }
}

impl Store for MemoryStore {
    fn add_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check_writable(&inner)?;
        inner.state.add_job(job)
    }

    fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check_writable(&inner)?;
        inner.state.update_job(job)?;
        #[cfg(any(test, feature = "test-support"))]
        inner.job_updates.push((job.id.clone(), job.status));
        Ok(())
    }

    fn get_all_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.inner.lock().state.jobs.clone())
    }

    fn add_vehicle(&self, vehicle: &VehicleRegistration) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check_writable(&inner)?;
        inner.state.add_vehicle(vehicle)
    }

    fn get_all_vehicles(&self) -> Result<Vec<VehicleRegistration>, StoreError> {
        Ok(self.inner.lock().state.vehicles.clone())
    }

    fn add_user(&self, user: &User) -> Result<(), StoreError> {
        self.inner.lock().state.add_user(user);
        Ok(())
    }

    fn get_user_by_id(&self, id: u32) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().state.users.get(&id).cloned())
    }

    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        self.inner.lock().state.schedule = schedule.clone();
        Ok(())
    }

    fn load_schedule(&self) -> Result<Schedule, StoreError> {
        Ok(self.inner.lock().state.schedule.clone())
    }

    fn save_job_states(&self, states: &JobStates) -> Result<(), StoreError> {
        self.inner.lock().state.job_states = states.clone();
        Ok(())
    }

    fn load_job_states(&self) -> Result<JobStates, StoreError> {
        Ok(self.inner.lock().state.job_states.clone())
    }

    fn save_pending(&self, pending: &[PendingRequest]) -> Result<(), StoreError> {
        self.inner.lock().state.pending = pending.to_vec();
        Ok(())
    }

    fn load_pending(&self) -> Result<Vec<PendingRequest>, StoreError> {
        Ok(self.inner.lock().state.pending.clone())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
