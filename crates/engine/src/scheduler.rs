// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO scheduling over approved jobs.
//!
//! The controller models a single execution slot: jobs run strictly in
//! `created_at` order, one at a time. The schedule itself is a derived
//! projection, recomputed in full and written back wholesale.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vc_core::time_fmt::{format_duration_label, format_remaining};
use vc_core::{format_timestamp, Clock, Job, JobId, JobState, VehicleRegistration};
use vc_storage::{JobStates, Schedule, Store};

use crate::error::SchedulerError;

/// Schedule label for a completed job with no recorded estimate.
const COMPLETED_LABEL: &str = "Completed";

/// Placeholder for report cells with no value.
const NO_VALUE: &str = "-";

/// Outcome of [`Scheduler::advance_queue`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub completed: Option<JobId>,
    /// The job that now holds the execution slot
    pub started: Option<JobId>,
}

/// Job counts per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub pending_approval: usize,
    pub queued: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl QueueSummary {
    pub fn get(&self, state: JobState) -> usize {
        match state {
            JobState::PendingApproval => self.pending_approval,
            JobState::Queued => self.queued,
            JobState::InProgress => self.in_progress,
            JobState::Completed => self.completed,
        }
    }

    fn bump(&mut self, state: JobState) {
        match state {
            JobState::PendingApproval => self.pending_approval += 1,
            JobState::Queued => self.queued += 1,
            JobState::InProgress => self.in_progress += 1,
            JobState::Completed => self.completed += 1,
        }
    }
}

/// One line of the scheduling report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub job_id: JobId,
    pub duration: String,
    /// Cumulative time until this job finishes
    pub remaining: String,
    pub completion: String,
    pub state: JobState,
}

pub struct Scheduler<S: ?Sized, C> {
    store: Arc<S>,
    clock: C,
}

impl<S: ?Sized, C: Clone> Clone for Scheduler<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: self.clock.clone(),
        }
    }
}

impl<S, C> Scheduler<S, C>
where
    S: Store + ?Sized,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Recompute every estimate and normalize job states.
    ///
    /// The first non-completed job (in `created_at` order) holds the slot
    /// unless another job already does; every other job is queued behind it.
    pub fn calculate_completion_times(&self) -> Result<Schedule, SchedulerError> {
        let jobs = self.schedulable_jobs()?;
        let mut states = self.store.load_job_states()?;
        let previous = self.store.load_schedule()?;

        let mut running = jobs
            .iter()
            .find(|job| effective_state(&states, job) == JobState::InProgress)
            .map(|job| job.id.clone());

        let mut at = self.clock.now();
        let mut schedule = Schedule::new();

        for job in jobs {
            let current = effective_state(&states, &job);
            if current == JobState::Completed {
                let entry = previous
                    .get(&job.id)
                    .cloned()
                    .unwrap_or_else(|| COMPLETED_LABEL.to_string());
                schedule.insert(job.id.clone(), entry);
                states.insert(job.id, JobState::Completed);
                continue;
            }

            let next = match &running {
                None => {
                    running = Some(job.id.clone());
                    JobState::InProgress
                }
                Some(id) if *id == job.id => JobState::InProgress,
                Some(_) => JobState::Queued,
            };
            if next != current {
                debug!(job_id = %job.id, from = %current, to = %next, "job state normalized");
                self.store.update_job(&job.clone().with_status(next))?;
            }
            states.insert(job.id.clone(), next);

            at += job_span(&job);
            schedule.insert(job.id, format_timestamp(&at));
        }

        self.save_states(states)?;
        self.store.save_schedule(&schedule)?;
        debug!(jobs = schedule.len(), "schedule recomputed");
        Ok(schedule)
    }

    /// Complete the running job and start the earliest queued one.
    ///
    /// No-op when nothing is running and nothing is queued.
    pub fn advance_queue(&self) -> Result<Advance, SchedulerError> {
        let jobs = self.schedulable_jobs()?;
        let mut states = self.store.load_job_states()?;

        let running = jobs
            .iter()
            .find(|job| effective_state(&states, job) == JobState::InProgress)
            .cloned();
        let next = jobs
            .iter()
            .find(|job| effective_state(&states, job) == JobState::Queued)
            .cloned();

        if running.is_none() && next.is_none() {
            info!("advance: nothing in progress and nothing queued");
            return Ok(Advance::default());
        }

        let mut advance = Advance::default();
        if let Some(job) = running {
            self.store
                .update_job(&job.clone().with_status(JobState::Completed))?;
            states.insert(job.id.clone(), JobState::Completed);
            info!(job_id = %job.id, "job completed");
            advance.completed = Some(job.id);
        }
        if let Some(job) = next {
            self.store
                .update_job(&job.clone().with_status(JobState::InProgress))?;
            states.insert(job.id.clone(), JobState::InProgress);
            info!(job_id = %job.id, "job started");
            advance.started = Some(job.id);
        }

        self.save_states(states)?;
        self.calculate_completion_times()?;
        Ok(advance)
    }

    /// Promote queued jobs, earliest first, one per available vehicle.
    ///
    /// Returns the number of promotions. A positive count triggers a full
    /// recompute, which puts every job but the earliest running one back in
    /// the queue.
    pub fn assign_vehicles_to_jobs(
        &self,
        vehicles: &[VehicleRegistration],
    ) -> Result<usize, SchedulerError> {
        let jobs = self.schedulable_jobs()?;
        let mut states = self.store.load_job_states()?;

        let queued: Vec<Job> = jobs
            .into_iter()
            .filter(|job| effective_state(&states, job) == JobState::Queued)
            .collect();

        let mut count = 0;
        for (job, vehicle) in queued.into_iter().zip(vehicles) {
            self.store
                .update_job(&job.clone().with_status(JobState::InProgress))?;
            debug!(job_id = %job.id, vin = %vehicle.vin, "vehicle assigned");
            states.insert(job.id, JobState::InProgress);
            count += 1;
        }

        if count > 0 {
            self.save_states(states)?;
            self.calculate_completion_times()?;
            info!(count, "vehicles assigned to jobs");
        } else {
            info!("no vehicles assigned");
        }
        Ok(count)
    }

    /// Per-state job counts; `pending` is the live approval queue length.
    pub fn queue_summary(&self, pending: usize) -> Result<QueueSummary, SchedulerError> {
        let states = self.store.load_job_states()?;
        let mut summary = QueueSummary {
            pending_approval: pending,
            ..QueueSummary::default()
        };
        for job in self.schedulable_jobs()? {
            match effective_state(&states, &job) {
                JobState::PendingApproval => {
                    warn!(job_id = %job.id, "approved job recorded as pending, not counted");
                }
                state => summary.bump(state),
            }
        }
        Ok(summary)
    }

    pub fn load_schedule(&self) -> Result<Schedule, SchedulerError> {
        Ok(self.store.load_schedule()?)
    }

    pub fn load_job_states(&self) -> Result<JobStates, SchedulerError> {
        Ok(self.store.load_job_states()?)
    }

    /// Recorded completion estimate for one job.
    pub fn completion_time(&self, job_id: &str) -> Result<Option<String>, SchedulerError> {
        Ok(self.store.load_schedule()?.get(job_id).cloned())
    }

    /// Long-form duration label, e.g. `"1 hour 30 mins"`.
    pub fn duration_label(&self, job: &Job) -> String {
        format_duration_label(job_span(job).num_minutes())
    }

    /// Tabular view of every approved job in `created_at` order.
    pub fn scheduling_report(&self) -> Result<Vec<ReportRow>, SchedulerError> {
        let schedule = self.store.load_schedule()?;
        let states = self.store.load_job_states()?;

        let mut total_minutes = 0;
        let rows = self
            .schedulable_jobs()?
            .into_iter()
            .map(|job| {
                let state = effective_state(&states, &job);
                let remaining = match state {
                    JobState::Queued | JobState::InProgress => {
                        total_minutes += job_span(&job).num_minutes();
                        format_remaining(total_minutes)
                    }
                    JobState::Completed => COMPLETED_LABEL.to_string(),
                    JobState::PendingApproval => NO_VALUE.to_string(),
                };
                ReportRow {
                    completion: schedule
                        .get(&job.id)
                        .cloned()
                        .unwrap_or_else(|| NO_VALUE.to_string()),
                    job_id: job.id,
                    duration: job.duration,
                    remaining,
                    state,
                }
            })
            .collect();
        Ok(rows)
    }

    /// Approved jobs, stably sorted by submission time.
    fn schedulable_jobs(&self) -> Result<Vec<Job>, SchedulerError> {
        let mut jobs: Vec<Job> = self
            .store
            .get_all_jobs()?
            .into_iter()
            .filter(|job| job.status.is_schedulable())
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }

    fn save_states(&self, mut states: JobStates) -> Result<(), SchedulerError> {
        states.retain(|_, state| state.is_schedulable());
        self.store.save_job_states(&states)?;
        Ok(())
    }
}

/// Last recorded state, falling back to the job's own status.
fn effective_state(states: &JobStates, job: &Job) -> JobState {
    states.get(&job.id).copied().unwrap_or(job.status)
}

/// Parsed duration, or one hour when the text is unusable.
fn job_span(job: &Job) -> Duration {
    match job.duration_span() {
        Ok(span) => span,
        Err(e) => {
            warn!(job_id = %job.id, duration = %job.duration, error = %e, "invalid job duration, assuming one hour");
            Duration::hours(1)
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
