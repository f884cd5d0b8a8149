// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches one [`Request`] to a [`Response`] against the repository,
//! classifier, and scheduler. One call per connection (§4.13) -- no
//! handler here blocks longer than a single filesystem operation, except
//! `Kill`, which awaits process-tree termination.

use std::sync::Arc;
use std::time::Duration;

use barn_core::job::{JobState, NewJob, RetryPolicy};
use barn_core::Clock;
use barn_engine::{process, reap, Classifier, Scheduler};
use barn_storage::JobRepository;
use barn_wire::{ErrorPayload, JobView, NewJobRequest, Request, Response, StatusView};

use crate::config::Config;

pub struct Handlers<C: Clock> {
    repo: Arc<JobRepository<C>>,
    clock: C,
    classifier: Arc<Classifier>,
    scheduler: Arc<Scheduler<C>>,
    config: Config,
}

impl<C: Clock + 'static> Handlers<C> {
    pub fn new(
        repo: Arc<JobRepository<C>>,
        clock: C,
        classifier: Arc<Classifier>,
        scheduler: Arc<Scheduler<C>>,
        config: Config,
    ) -> Self {
        Self { repo, clock, classifier, scheduler, config }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Create(req) => self.create(req),
            Request::Cancel { id } => self.cancel(&id).await,
            Request::Kill { id } => self.kill(&id).await,
            Request::Describe { id } => self.describe(&id),
            Request::List { state } => self.list(state),
            Request::Clean => self.clean(),
            Request::Status => self.status(),
            Request::Reload => Response::Ok,
        }
    }

    fn create(&self, req: NewJobRequest) -> Response {
        if req.command.is_empty() {
            return err("invalid_argument", "command must not be empty");
        }

        let load_level = req.load_level.unwrap_or_else(|| self.classifier.classify(&req.command));
        let policy = if req.policy == RetryPolicy::default() {
            self.config.default_retry_policy.clone()
        } else {
            req.policy
        };

        let new_job = NewJob { command: req.command, tag: req.tag, load_level, policy };
        match self.repo.create(new_job) {
            Ok(job) => Response::Job { job: JobView::from(&job) },
            Err(e) => err("storage_error", &e.to_string()),
        }
    }

    async fn cancel(&self, id: &str) -> Response {
        let job = match self.repo.find_by_id(id) {
            Ok(Some(job)) => job,
            Ok(None) => return err("not_found", id),
            Err(e) => return err("storage_error", &e.to_string()),
        };

        match job.state {
            JobState::Queued => match self.repo.mark_canceled(id) {
                Ok(()) => Response::Ok,
                Err(e) => err("storage_error", &e.to_string()),
            },
            JobState::Running => self.terminate_and_cancel(id, job.pid).await,
            _ => err("already_terminal", id),
        }
    }

    async fn kill(&self, id: &str) -> Response {
        let job = match self.repo.find_by_id(id) {
            Ok(Some(job)) => job,
            Ok(None) => return err("not_found", id),
            Err(e) => return err("storage_error", &e.to_string()),
        };

        if job.state != JobState::Running {
            return err("not_running", id);
        }
        self.terminate_and_cancel(id, job.pid).await
    }

    async fn terminate_and_cancel(&self, id: &str, pid: Option<u64>) -> Response {
        if let Some(pid) = pid {
            if let Err(e) = process::terminate_tree(pid, Duration::from_secs(10)).await {
                tracing::warn!(job_id = %id, pid, error = %e, "failed to terminate process tree");
            }
        }
        match self.repo.mark_canceled(id) {
            Ok(()) => Response::Ok,
            Err(e) => err("storage_error", &e.to_string()),
        }
    }

    fn describe(&self, id: &str) -> Response {
        match self.repo.find_by_id(id) {
            Ok(Some(job)) => Response::Job { job: JobView::from(&job) },
            Ok(None) => err("not_found", id),
            Err(e) => err("storage_error", &e.to_string()),
        }
    }

    fn list(&self, state: Option<JobState>) -> Response {
        let jobs = match state {
            Some(state) => self.repo.find_by_state(state),
            None => self.repo.find_all(),
        };
        match jobs {
            Ok(jobs) => Response::Jobs { jobs: jobs.iter().map(JobView::from).collect() },
            Err(e) => err("storage_error", &e.to_string()),
        }
    }

    fn clean(&self) -> Response {
        let deleted = reap(&self.repo, &self.clock, &self.config.reaper);
        Response::Cleaned { deleted }
    }

    fn status(&self) -> Response {
        let status = self.scheduler.status();
        Response::Status {
            status: StatusView {
                running: status.running,
                queued: status.queued,
                running_high: status.running_high,
                running_medium: status.running_medium,
                running_low: status.running_low,
                limits: status.limits,
            },
        }
    }
}

fn err(kind: &str, message: &str) -> Response {
    Response::Err { error: ErrorPayload::new(kind, message) }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
