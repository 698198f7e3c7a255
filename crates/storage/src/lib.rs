// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for the controller.
//!
//! The engine treats persistence as an opaque [`Store`]: simple per-call
//! atomic CRUD operations. Implementations serialize their own writes.

mod memory;
mod snapshot;
mod state;

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;
use vc_core::{Job, JobId, JobState, PendingRequest, User, VehicleRegistration, Vin};

pub use memory::MemoryStore;
pub use snapshot::{FileStore, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::StoreState;

/// Job id to estimated completion text, in scheduling order.
pub type Schedule = IndexMap<JobId, String>;

/// Last known lifecycle state per job.
pub type JobStates = HashMap<JobId, JobState>;

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateJob(JobId),

    #[error("vehicle {0} already registered")]
    DuplicateVehicle(Vin),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable persistence collaborator for jobs, vehicles, users and the
/// scheduler's derived projections.
pub trait Store: Send + Sync + 'static {
    fn add_job(&self, job: &Job) -> Result<(), StoreError>;
    fn update_job(&self, job: &Job) -> Result<(), StoreError>;
    fn get_all_jobs(&self) -> Result<Vec<Job>, StoreError>;

    fn add_vehicle(&self, vehicle: &VehicleRegistration) -> Result<(), StoreError>;
    fn get_all_vehicles(&self) -> Result<Vec<VehicleRegistration>, StoreError>;

    fn add_user(&self, user: &User) -> Result<(), StoreError>;
    fn get_user_by_id(&self, id: u32) -> Result<Option<User>, StoreError>;

    /// Replace the stored schedule wholesale.
    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError>;
    fn load_schedule(&self) -> Result<Schedule, StoreError>;

    /// Replace the stored state map wholesale.
    fn save_job_states(&self, states: &JobStates) -> Result<(), StoreError>;
    fn load_job_states(&self) -> Result<JobStates, StoreError>;

    /// Mirror of the in-memory pending queue, replaced wholesale.
    fn save_pending(&self, pending: &[PendingRequest]) -> Result<(), StoreError>;
    fn load_pending(&self) -> Result<Vec<PendingRequest>, StoreError>;
}
