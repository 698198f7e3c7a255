// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store.
//!
//! The whole [`StoreState`] is written as one JSON snapshot after every
//! mutation. Writes go to a `.tmp` sibling and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use vc_core::{Job, PendingRequest, User, VehicleRegistration};

use crate::{JobStates, Schedule, Store, StoreError, StoreState};

/// Snapshot layout version written by this build.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is newer than supported version {supported}")]
    TooNew { found: u32, supported: u32 },
}

/// The complete store contents at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: StoreState,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(state: StoreState) -> Self {
        Self {
            version: CURRENT_SNAPSHOT_VERSION,
            state,
            saved_at: Utc::now(),
        }
    }

    /// Save atomically (write to .tmp, then rename).
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load a snapshot if one exists.
    ///
    /// A file that does not parse is moved aside to `.bak` and `Ok(None)` is
    /// returned so the controller starts empty rather than refusing to boot.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(path)?);
        match serde_json::from_reader::<_, Snapshot>(reader) {
            Ok(snapshot) if snapshot.version > CURRENT_SNAPSHOT_VERSION => {
                Err(SnapshotError::TooNew {
                    found: snapshot.version,
                    supported: CURRENT_SNAPSHOT_VERSION,
                })
            }
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                let bak_path = rotate_bak_path(path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "corrupt store snapshot, moving to .bak and starting fresh",
                );
                fs::rename(path, &bak_path)?;
                Ok(None)
            }
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Next free `.bak` path, keeping at most [`MAX_BAK_FILES`] older copies.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Store persisted as a JSON snapshot on disk.
///
/// Each mutation is applied to a copy, written out, and only then committed
/// in memory, so a failed write leaves both disk and memory unchanged.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing snapshot.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match Snapshot::load(&path)? {
            Some(snapshot) => {
                debug!(
                    path = %path.display(),
                    jobs = snapshot.state.jobs.len(),
                    vehicles = snapshot.state.vehicles.len(),
                    pending = snapshot.state.pending.len(),
                    "loaded store snapshot",
                );
                snapshot.state
            }
            None => StoreState::default(),
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.lock();
        let mut next = guard.clone();
        let out = f(&mut next)?;
        Snapshot::new(next.clone()).save(&self.path)?;
        *guard = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        Ok(f(&self.state.lock()))
    }
}

impl Store for FileStore {
    fn add_job(&self, job: &Job) -> Result<(), StoreError> {
        self.mutate(|s| s.add_job(job))
    }

    fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        self.mutate(|s| s.update_job(job))
    }

    fn get_all_jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.read(|s| s.jobs.clone())
    }

    fn add_vehicle(&self, vehicle: &VehicleRegistration) -> Result<(), StoreError> {
        self.mutate(|s| s.add_vehicle(vehicle))
    }

    fn get_all_vehicles(&self) -> Result<Vec<VehicleRegistration>, StoreError> {
        self.read(|s| s.vehicles.clone())
    }

    fn add_user(&self, user: &User) -> Result<(), StoreError> {
        self.mutate(|s| {
            s.add_user(user);
            Ok(())
        })
    }

    fn get_user_by_id(&self, id: u32) -> Result<Option<User>, StoreError> {
        self.read(|s| s.users.get(&id).cloned())
    }

    fn save_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        self.mutate(|s| {
            s.schedule = schedule.clone();
            Ok(())
        })
    }

    fn load_schedule(&self) -> Result<Schedule, StoreError> {
        self.read(|s| s.schedule.clone())
    }

    fn save_job_states(&self, states: &JobStates) -> Result<(), StoreError> {
        self.mutate(|s| {
            s.job_states = states.clone();
            Ok(())
        })
    }

    fn load_job_states(&self) -> Result<JobStates, StoreError> {
        self.read(|s| s.job_states.clone())
    }

    fn save_pending(&self, pending: &[PendingRequest]) -> Result<(), StoreError> {
        self.mutate(|s| {
            s.pending = pending.to_vec();
            Ok(())
        })
    }

    fn load_pending(&self) -> Result<Vec<PendingRequest>, StoreError> {
        self.read(|s| s.pending.clone())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
