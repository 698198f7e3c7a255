// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller handle and the engine task behind it.
//!
//! All scheduling work and all post-approval bookkeeping happen on one task
//! that consumes [`Command`]s in order. Store writes for approvals run on
//! blocking workers, bounded by a semaphore, and report back to the same task.
//! Scheduler and mirror writes also run on the blocking pool, but the task
//! waits for each one before taking the next command.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, error, info, warn};
use vc_core::{
    Clock, ConnectionId, Event, Payload, PendingRequest, RequestId, RequestKind,
};
use vc_storage::{JobStates, Schedule, Store, StoreError};

use crate::approval::{self, ApprovalOutcome, ApprovalWorkflow, DeadLetter, Dispatch, OnDone};
use crate::error::{EngineError, SchedulerError};
use crate::event_bus::EventBus;
use crate::pending::PendingQueue;
use crate::scheduler::{Advance, QueueSummary, ReportRow, Scheduler};

type Reply<T> = oneshot::Sender<Result<T, SchedulerError>>;

/// Work items for the engine task.
pub(crate) enum Command {
    Persist {
        request: PendingRequest,
        on_done: Option<OnDone>,
    },
    Persisted {
        request: PendingRequest,
        result: Result<(), StoreError>,
        on_done: Option<OnDone>,
    },
    /// Write the current pending queue to the store
    MirrorPending,
    Recompute(Reply<Schedule>),
    Advance(Reply<Advance>),
    AssignVehicles(Reply<usize>),
    Summary(Reply<QueueSummary>),
    Report(Reply<Vec<ReportRow>>),
    LoadSchedule(Reply<Schedule>),
    LoadJobStates(Reply<JobStates>),
    Shutdown,
}

/// Tuning knobs for the engine.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on concurrently running approval store writes
    pub max_approval_workers: usize,
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_approval_workers: 4,
            event_capacity: 256,
        }
    }
}

/// Cheap, cloneable handle exposing the controller's operations.
#[derive(Clone)]
pub struct Controller {
    queue: Arc<PendingQueue>,
    approvals: ApprovalWorkflow,
    commands: mpsc::UnboundedSender<Command>,
    events: EventBus,
    users: Arc<dyn Store>,
    dead_letters: Arc<Mutex<Vec<DeadLetter>>>,
}

/// The engine task. Drive it with [`Engine::run`].
pub struct Engine<S: Store, C: Clock> {
    store: Arc<S>,
    scheduler: Scheduler<S, C>,
    queue: Arc<PendingQueue>,
    events: EventBus,
    dead_letters: Arc<Mutex<Vec<DeadLetter>>>,
    workers: Arc<Semaphore>,
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
    in_flight: usize,
    stopping: bool,
}

impl Controller {
    /// Build the controller and its engine.
    ///
    /// The pending queue is restored from the store's mirror, if any. The
    /// caller must spawn [`Engine::run`] for queued work to make progress.
    pub fn start<S: Store, C: Clock>(
        store: Arc<S>,
        clock: C,
        config: ControllerConfig,
    ) -> Result<(Controller, Engine<S, C>), EngineError> {
        let restored = store.load_pending()?;
        if !restored.is_empty() {
            info!(count = restored.len(), "restored pending requests");
        }
        let queue = Arc::new(PendingQueue::restore(restored));
        let events = EventBus::new(config.event_capacity);
        let dead_letters = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();

        let users: Arc<dyn Store> = store.clone();
        let controller = Controller {
            queue: Arc::clone(&queue),
            approvals: ApprovalWorkflow::new(Arc::clone(&queue), tx.clone(), events.clone()),
            commands: tx.clone(),
            events: events.clone(),
            users,
            dead_letters: Arc::clone(&dead_letters),
        };
        let engine = Engine {
            scheduler: Scheduler::new(Arc::clone(&store), clock),
            store,
            queue,
            events,
            dead_letters,
            workers: Arc::new(Semaphore::new(config.max_approval_workers.max(1))),
            tx,
            rx,
            in_flight: 0,
            stopping: false,
        };
        Ok((controller, engine))
    }

    /// Put a submission in front of the operator.
    ///
    /// `owner` is the submitting user's id, used only to describe the
    /// submitter. Never rejects.
    pub fn submit_for_approval(
        &self,
        payload: Payload,
        owner: Option<u32>,
        origin: Option<ConnectionId>,
    ) -> RequestId {
        let submitter = self.describe_submitter(owner);
        let kind = payload.kind();
        let subject = payload.subject();
        let id = self.queue.enqueue(payload, submitter.clone(), origin);
        info!(request_id = %id, %kind, %subject, "submission queued for approval");

        self.events.send(Event::RequestSubmitted {
            request_id: id,
            kind,
            subject,
            submitter,
        });
        if self.commands.send(Command::MirrorPending).is_err() {
            debug!(request_id = %id, "engine stopped, pending mirror not updated");
        }
        id
    }

    pub fn list_pending(&self) -> Vec<PendingRequest> {
        self.queue.list()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn approve<F>(&self, id: RequestId, on_done: F) -> Result<Dispatch, EngineError>
    where
        F: FnOnce(&ApprovalOutcome) + Send + 'static,
    {
        self.approvals.approve(id, Box::new(on_done))
    }

    pub fn reject(&self, id: RequestId) -> bool {
        self.approvals.reject(id)
    }

    pub fn approvals(&self) -> &ApprovalWorkflow {
        &self.approvals
    }

    pub async fn calculate_completion_times(&self) -> Result<Schedule, EngineError> {
        self.request(Command::Recompute).await
    }

    pub async fn advance_queue(&self) -> Result<Advance, EngineError> {
        self.request(Command::Advance).await
    }

    /// Assign every registered vehicle to the earliest queued jobs.
    pub async fn assign_vehicles_to_jobs(&self) -> Result<usize, EngineError> {
        self.request(Command::AssignVehicles).await
    }

    pub async fn queue_summary(&self) -> Result<QueueSummary, EngineError> {
        self.request(Command::Summary).await
    }

    pub async fn scheduling_report(&self) -> Result<Vec<ReportRow>, EngineError> {
        self.request(Command::Report).await
    }

    pub async fn load_schedule(&self) -> Result<Schedule, EngineError> {
        self.request(Command::LoadSchedule).await
    }

    pub async fn load_job_states(&self) -> Result<JobStates, EngineError> {
        self.request(Command::LoadJobStates).await
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.lock().clone()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Ask the engine to stop once in-flight approvals have settled.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    fn describe_submitter(&self, owner: Option<u32>) -> String {
        let Some(id) = owner else {
            return "Unknown".to_string();
        };
        match self.users.get_user_by_id(id) {
            Ok(Some(user)) => user.describe(),
            Ok(None) => format!("User ID: {id}"),
            Err(e) => {
                warn!(user_id = id, error = %e, "user lookup failed");
                format!("User ID: {id}")
            }
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| EngineError::Stopped)?;
        Ok(rx.await.map_err(|_| EngineError::Stopped)??)
    }
}

impl<S: Store, C: Clock> Engine<S, C> {
    /// Process commands until shut down.
    pub async fn run(mut self) {
        info!("engine started");
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
            if self.stopping && self.in_flight == 0 {
                break;
            }
        }
        info!("engine stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Persist { request, on_done } => self.dispatch_persist(request, on_done),
            Command::Persisted {
                request,
                result,
                on_done,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.settle(request, result, on_done).await;
            }
            Command::MirrorPending => self.mirror_pending().await,
            Command::Recompute(reply) => {
                let result = self.recompute().await;
                let _ = reply.send(result);
            }
            Command::Advance(reply) => {
                let result = self.off_task(|s| s.advance_queue()).await;
                if let Ok(advance) = &result {
                    self.events.send(Event::QueueAdvanced {
                        completed: advance.completed.clone(),
                        started: advance.started.clone(),
                    });
                }
                let _ = reply.send(result);
            }
            Command::AssignVehicles(reply) => {
                let store = Arc::clone(&self.store);
                let result = self
                    .off_task(move |s| {
                        let vehicles = store.get_all_vehicles()?;
                        s.assign_vehicles_to_jobs(&vehicles)
                    })
                    .await;
                if let Ok(count) = result {
                    self.events.send(Event::VehiclesAssigned { count });
                }
                let _ = reply.send(result);
            }
            Command::Summary(reply) => {
                let pending = self.queue.len();
                let _ = reply.send(self.off_task(move |s| s.queue_summary(pending)).await);
            }
            Command::Report(reply) => {
                let _ = reply.send(self.off_task(|s| s.scheduling_report()).await);
            }
            Command::LoadSchedule(reply) => {
                let _ = reply.send(self.off_task(|s| s.load_schedule()).await);
            }
            Command::LoadJobStates(reply) => {
                let _ = reply.send(self.off_task(|s| s.load_job_states()).await);
            }
            Command::Shutdown => {
                info!(in_flight = self.in_flight, "engine shutdown requested");
                self.stopping = true;
            }
        }
    }

    /// Run scheduler work on the blocking pool and wait for it.
    fn off_task<T, F>(&self, work: F) -> impl Future<Output = Result<T, SchedulerError>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&Scheduler<S, C>) -> Result<T, SchedulerError> + Send + 'static,
    {
        let scheduler = self.scheduler.clone();
        async move {
            tokio::task::spawn_blocking(move || work(&scheduler))
                .await
                .unwrap_or_else(|e| {
                    Err(StoreError::Unavailable(format!("scheduler worker: {e}")).into())
                })
        }
    }

    async fn recompute(&mut self) -> Result<Schedule, SchedulerError> {
        let result = self.off_task(|s| s.calculate_completion_times()).await;
        if let Ok(schedule) = &result {
            self.events.send(Event::ScheduleUpdated {
                jobs: schedule.len(),
            });
        }
        result
    }

    async fn mirror_pending(&mut self) {
        let pending = self.queue.list();
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || store.save_pending(&pending))
            .await
            .unwrap_or_else(|e| Err(StoreError::Unavailable(format!("mirror worker: {e}"))));
        if let Err(e) = result {
            warn!(error = %e, "failed to mirror pending queue");
        }
    }

    fn dispatch_persist(&mut self, request: PendingRequest, on_done: Option<OnDone>) {
        self.in_flight += 1;
        let store = Arc::clone(&self.store);
        let workers = Arc::clone(&self.workers);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = workers.acquire_owned().await.ok();
            let payload = request.payload.clone();
            let result = tokio::task::spawn_blocking(move || approval::persist(&*store, &payload))
                .await
                .unwrap_or_else(|e| Err(StoreError::Unavailable(format!("persist worker: {e}"))));
            let _ = tx.send(Command::Persisted {
                request,
                result,
                on_done,
            });
        });
    }

    async fn settle(
        &mut self,
        request: PendingRequest,
        result: Result<(), StoreError>,
        on_done: Option<OnDone>,
    ) {
        let request_id = request.id;
        let subject = request.subject();

        let outcome = match result {
            Ok(()) => {
                info!(%request_id, %subject, "approved payload persisted");
                if request.kind() == RequestKind::Job {
                    if let Err(e) = self.recompute().await {
                        warn!(%request_id, error = %e, "recompute after approval failed");
                    }
                }
                self.events.send(Event::RequestApproved {
                    request_id,
                    subject: subject.clone(),
                    origin: request.origin.clone(),
                });
                ApprovalOutcome::Approved {
                    request_id,
                    subject,
                }
            }
            Err(e) => {
                error!(%request_id, %subject, error = %e, "approved payload could not be persisted, dead-lettered");
                let error = e.to_string();
                self.events.send(Event::ApprovalFailed {
                    request_id,
                    subject: subject.clone(),
                    error: error.clone(),
                });
                self.dead_letters.lock().push(DeadLetter {
                    request,
                    error: error.clone(),
                    failed_at: self.scheduler.clock().now(),
                });
                ApprovalOutcome::Failed {
                    request_id,
                    subject,
                    error,
                }
            }
        };

        if let Some(on_done) = on_done {
            on_done(&outcome);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
