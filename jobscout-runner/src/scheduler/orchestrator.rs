//! Task orchestrator
//!
//! Runs each task as submit -> poll -> fetch -> export, and fans a whole
//! plan out as one spawned task per (location, query) pair. Tasks share the
//! repository, exporter and payload template through `Arc`; each one builds
//! its own payload copy.

use chrono::{DateTime, Utc};
use jobscout_core::domain::job::{JobId, JobStatus};
use jobscout_core::domain::task::{Task, expand_tasks};
use jobscout_core::payload::PayloadTemplate;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::TaskError;
use crate::repository::JobRepository;
use crate::scheduler::JobPoller;
use crate::service::Exporter;

/// How a single task ended
#[derive(Debug)]
pub enum TaskOutcome {
    /// Listings were written to `path`
    Exported {
        job_id: JobId,
        path: PathBuf,
        listings: usize,
    },
    /// The remote job reported `failed`; nothing was fetched or written
    JobFailed { job_id: JobId },
    /// The task stopped on a local or transport error
    Errored(TaskError),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Exported { .. })
    }
}

/// A finished task with its timing
#[derive(Debug)]
pub struct TaskRecord {
    pub task: Task,
    pub outcome: TaskOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of every task of a run, in plan order
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<TaskRecord>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }
}

/// Runs tasks against the scraping API
#[derive(Clone)]
pub struct TaskOrchestrator {
    jobs: Arc<dyn JobRepository>,
    exporter: Arc<dyn Exporter>,
    template: Arc<PayloadTemplate>,
    poller: JobPoller,
    semaphore: Arc<Semaphore>,
}

impl TaskOrchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    /// * `config` - Provides the polling schedule and concurrency limit
    /// * `jobs` - Repository shared by all tasks
    /// * `exporter` - Exporter shared by all tasks
    /// * `template` - Immutable payload template
    pub fn new(
        config: &Config,
        jobs: Arc<dyn JobRepository>,
        exporter: Arc<dyn Exporter>,
        template: Arc<PayloadTemplate>,
    ) -> Self {
        let poller = JobPoller::new(Arc::clone(&jobs), config.poll_policy());
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_tasks.max(1)));

        Self {
            jobs,
            exporter,
            template,
            poller,
            semaphore,
        }
    }

    /// Runs one task to completion
    ///
    /// Never returns an error: failures are reported in the outcome so the
    /// caller can keep running sibling tasks.
    pub async fn run_task(&self, task: &Task) -> TaskOutcome {
        match self.execute(task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Task {} failed: {}", task, e);
                TaskOutcome::Errored(e)
            }
        }
    }

    async fn execute(&self, task: &Task) -> Result<TaskOutcome, TaskError> {
        let payload = self.template.for_task(task)?;

        info!("Submitting job for {}", task);
        let job_id = self.jobs.submit(&payload).await?;
        info!("Task {} submitted as job {}", task, job_id);

        let status = self.poller.wait_for_completion(&job_id).await?;
        if status == JobStatus::Failed {
            warn!("Job {} for {} failed remotely, skipping export", job_id, task);
            return Ok(TaskOutcome::JobFailed { job_id });
        }

        let listings = self.jobs.fetch_results(&job_id).await?;
        let path = self.exporter.export(&job_id, task, &listings).await?;

        info!(
            "Task {} done: {} listing(s) written to {}",
            task,
            listings.len(),
            path.display()
        );

        Ok(TaskOutcome::Exported {
            job_id,
            path,
            listings: listings.len(),
        })
    }

    /// Runs every (location, query) combination concurrently
    ///
    /// Waits for all tasks whatever their outcome; a failed task never
    /// cancels its siblings.
    pub async fn run_all(
        &self,
        queries: &[String],
        locations_by_country: &BTreeMap<String, Vec<String>>,
    ) -> RunReport {
        self.run_tasks(expand_tasks(queries, locations_by_country))
            .await
    }

    /// Runs the given tasks concurrently and collects their outcomes
    ///
    /// A task whose output file name is already taken by an earlier task is
    /// not started and is reported as `OutputConflict`.
    pub async fn run_tasks(&self, tasks: Vec<Task>) -> RunReport {
        info!("Launching {} task(s)", tasks.len());

        let mut owners: HashMap<String, Task> = HashMap::new();
        let mut pending = Vec::with_capacity(tasks.len());
        for task in tasks {
            let file = task.output_file_name();
            if let Some(owner) = owners.get(&file) {
                warn!("Skipping {}: {} already writes {}", task, owner, file);
                let error = TaskError::OutputConflict {
                    file,
                    owner: owner.clone(),
                };
                pending.push((task, Err(error)));
                continue;
            }

            owners.insert(file, task.clone());
            let handle = self.spawn_task(task.clone());
            pending.push((task, Ok(handle)));
        }

        let mut report = RunReport::default();
        for (task, handle) in pending {
            let record = match handle {
                Ok(handle) => match handle.await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Task {} panicked: {}", task, e);
                        unstarted(task, TaskError::Panicked(e.to_string()))
                    }
                },
                Err(error) => unstarted(task, error),
            };
            report.records.push(record);
        }

        info!(
            "Run finished: {}/{} task(s) exported",
            report.succeeded(),
            report.total()
        );

        report
    }

    /// Spawns a task that waits for a concurrency permit, then runs
    fn spawn_task(&self, task: Task) -> tokio::task::JoinHandle<TaskRecord> {
        let orchestrator = self.clone();

        tokio::spawn(async move {
            // Held until the record is built
            let _permit = match Arc::clone(&orchestrator.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("Task {} not started: {}", task, e);
                    return unstarted(task, TaskError::Cancelled(e.to_string()));
                }
            };

            let started_at = Utc::now();
            let outcome = orchestrator.run_task(&task).await;

            TaskRecord {
                task,
                outcome,
                started_at,
                finished_at: Utc::now(),
            }
        })
    }
}

/// Record of a task that never ran
fn unstarted(task: Task, error: TaskError) -> TaskRecord {
    let now = Utc::now();
    TaskRecord {
        task,
        outcome: TaskOutcome::Errored(error),
        started_at: now,
        finished_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CsvExporter;
    use async_trait::async_trait;
    use jobscout_client::{ClientError, Credentials};
    use jobscout_core::domain::listing::JobListing;
    use jobscout_core::payload::Payload;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory scraping API
    ///
    /// The job id encodes the submitted url and geo_location, and the single
    /// listing returned for a job echoes them back, so any payload leaking
    /// between tasks shows up in the exported files.
    #[derive(Default)]
    struct FakeJobs {
        submitted: Mutex<Vec<Payload>>,
        polls: Mutex<HashMap<JobId, u32>>,
        fetched: Mutex<Vec<JobId>>,
        pending_polls: u32,
        failing_locations: Vec<String>,
        broken_locations: Vec<String>,
    }

    impl FakeJobs {
        fn split(job_id: &JobId) -> (String, String) {
            let (url, geo) = job_id.as_str().split_once('|').unwrap();
            (url.to_string(), geo.to_string())
        }

        fn submitted(&self) -> Vec<Payload> {
            self.submitted.lock().unwrap().clone()
        }

        fn fetched(&self) -> Vec<JobId> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobRepository for FakeJobs {
        async fn submit(&self, payload: &Payload) -> Result<JobId, ClientError> {
            let url = payload.url().unwrap_or_default().to_string();
            let geo = payload.geo_location().unwrap_or_default().to_string();
            self.submitted.lock().unwrap().push(payload.clone());

            // Let sibling tasks interleave between submit and poll
            tokio::task::yield_now().await;

            if self.broken_locations.contains(&geo) {
                return Err(ClientError::protocol("Job creation response has no id"));
            }

            Ok(JobId::new(format!("{}|{}", url, geo)))
        }

        async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError> {
            let polls = {
                let mut polls = self.polls.lock().unwrap();
                let count = polls.entry(job_id.clone()).or_insert(0);
                *count += 1;
                *count
            };
            tokio::task::yield_now().await;

            let (_, geo) = Self::split(job_id);
            if polls <= self.pending_polls {
                Ok(JobStatus::Pending)
            } else if self.failing_locations.contains(&geo) {
                Ok(JobStatus::Failed)
            } else {
                Ok(JobStatus::Done)
            }
        }

        async fn fetch_results(&self, job_id: &JobId) -> Result<Vec<JobListing>, ClientError> {
            self.fetched.lock().unwrap().push(job_id.clone());
            let (url, geo) = Self::split(job_id);

            Ok(vec![JobListing {
                job_title: Some("Dev".to_string()),
                location: Some(geo),
                url: Some(url),
                ..Default::default()
            }])
        }
    }

    fn test_config(output_dir: &std::path::Path) -> Config {
        let mut config = Config::new(Credentials::new("user", "pass"));
        config.output_dir = output_dir.to_path_buf();
        config.initial_delay = Duration::ZERO;
        config.poll_interval = Duration::from_millis(1);
        config.max_poll_attempts = 5;
        config.max_concurrent_tasks = 4;
        config
    }

    fn orchestrator(config: &Config, jobs: Arc<FakeJobs>) -> TaskOrchestrator {
        TaskOrchestrator::new(
            config,
            jobs,
            Arc::new(CsvExporter::new(&config.output_dir)),
            Arc::new(PayloadTemplate::google_jobs()),
        )
    }

    fn plan() -> (Vec<String>, BTreeMap<String, Vec<String>>) {
        let queries = vec![
            "developer".to_string(),
            "chef".to_string(),
            "manager".to_string(),
        ];
        let mut locations = BTreeMap::new();
        locations.insert(
            "com".to_string(),
            vec![
                "California,United States".to_string(),
                "Virginia,United States".to_string(),
            ],
        );
        locations.insert("co.uk".to_string(), vec!["London,England".to_string()]);
        (queries, locations)
    }

    #[tokio::test]
    async fn test_run_task_exports_listings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            pending_polls: 2,
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());
        let task = Task::new("developer", "com", "California,United States");

        let outcome = orchestrator.run_task(&task).await;

        match outcome {
            TaskOutcome::Exported { path, listings, .. } => {
                assert_eq!(listings, 1);
                assert_eq!(
                    path,
                    dir.path().join("developer_jobs_California_United_States.csv")
                );
            }
            other => panic!("expected export, got {:?}", other),
        }
        assert_eq!(jobs.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_is_not_fetched_or_exported() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            failing_locations: vec!["Ohio".to_string()],
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());
        let task = Task::new("chef", "com", "Ohio");

        let outcome = orchestrator.run_task(&task).await;

        assert!(matches!(outcome, TaskOutcome::JobFailed { .. }));
        assert!(jobs.fetched().is_empty());
        assert!(!dir.path().join(task.output_file_name()).exists());
    }

    #[tokio::test]
    async fn test_stuck_job_times_out() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            pending_polls: u32::MAX,
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());

        let outcome = orchestrator
            .run_task(&Task::new("chef", "com", "Ohio"))
            .await;

        assert!(matches!(
            outcome,
            TaskOutcome::Errored(TaskError::Timeout { attempts: 5, .. })
        ));
        assert!(jobs.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_run_all_creates_every_combination() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            pending_polls: 1,
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());
        let (queries, locations) = plan();

        let report = orchestrator.run_all(&queries, &locations).await;

        assert_eq!(report.total(), 9);
        assert_eq!(report.succeeded(), 9);
        assert_eq!(jobs.submitted().len(), 9);
        assert_eq!(jobs.fetched().len(), 9);
    }

    #[tokio::test]
    async fn test_concurrent_payloads_do_not_leak() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            pending_polls: 2,
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());
        let (queries, locations) = plan();
        let tasks = expand_tasks(&queries, &locations);

        orchestrator.run_all(&queries, &locations).await;

        let mut expected: Vec<(String, String)> = tasks
            .iter()
            .map(|t| {
                (
                    t.search_url().unwrap().to_string(),
                    t.location().to_string(),
                )
            })
            .collect();
        let mut submitted: Vec<(String, String)> = jobs
            .submitted()
            .iter()
            .map(|p| {
                (
                    p.url().unwrap().to_string(),
                    p.geo_location().unwrap().to_string(),
                )
            })
            .collect();
        expected.sort();
        submitted.sort();
        assert_eq!(submitted, expected);

        // Each file holds the url and location of its own task
        for task in &tasks {
            let path = dir.path().join(task.output_file_name());
            let content = std::fs::read_to_string(&path).expect("should read file");
            let row = content.lines().nth(1).expect("should have a data row");
            let url = task.search_url().unwrap().to_string();
            assert_eq!(row, format!("Dev,,\"{}\",,,,{}", task.location(), url));
        }
    }

    #[tokio::test]
    async fn test_failure_is_isolated_from_siblings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs {
            failing_locations: vec!["Virginia,United States".to_string()],
            broken_locations: vec!["London,England".to_string()],
            ..Default::default()
        });
        let orchestrator = orchestrator(&config, jobs.clone());
        let (queries, locations) = plan();

        let report = orchestrator.run_all(&queries, &locations).await;

        assert_eq!(report.total(), 9);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 6);

        for record in &report.records {
            let path = dir.path().join(record.task.output_file_name());
            match record.task.location() {
                "California,United States" => {
                    assert!(record.outcome.is_success());
                    assert!(path.exists());
                }
                "Virginia,United States" => {
                    assert!(matches!(record.outcome, TaskOutcome::JobFailed { .. }));
                    assert!(!path.exists());
                }
                _ => {
                    assert!(matches!(
                        record.outcome,
                        TaskOutcome::Errored(TaskError::Client(ClientError::Protocol(_)))
                    ));
                    assert!(!path.exists());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_rerun_overwrites_same_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs::default());
        let orchestrator = orchestrator(&config, jobs.clone());
        let task = Task::new("developer", "com", "California,United States");

        orchestrator.run_task(&task).await;
        let path = dir.path().join(task.output_file_name());
        let first = std::fs::read_to_string(&path).expect("should read file");

        orchestrator.run_task(&task).await;
        let second = std::fs::read_to_string(&path).expect("should read file");

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_tasks_sharing_a_file_run_once() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs::default());
        let orchestrator = orchestrator(&config, jobs.clone());

        let queries = vec!["c++".to_string(), "c#".to_string()];
        let mut locations = BTreeMap::new();
        locations.insert("com".to_string(), vec!["London".to_string()]);
        locations.insert("co.uk".to_string(), vec!["London".to_string()]);

        let report = orchestrator.run_all(&queries, &locations).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(jobs.submitted().len(), 1);

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, report.succeeded());

        let owner = &report.records[0];
        assert_eq!(owner.task, Task::new("c++", "co.uk", "London"));
        assert!(owner.outcome.is_success());

        for record in &report.records[1..] {
            match &record.outcome {
                TaskOutcome::Errored(TaskError::OutputConflict { file, owner: first }) => {
                    assert_eq!(file, "c_jobs_London.csv");
                    assert_eq!(first, &owner.task);
                }
                other => panic!("expected output conflict, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_closed_limiter_runs_nothing() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = test_config(dir.path());
        let jobs = Arc::new(FakeJobs::default());
        let orchestrator = orchestrator(&config, jobs.clone());
        orchestrator.semaphore.close();

        let (queries, locations) = plan();
        let report = orchestrator.run_all(&queries, &locations).await;

        assert_eq!(report.total(), 9);
        assert_eq!(report.succeeded(), 0);
        assert!(jobs.submitted().is_empty());
        assert!(
            report
                .records
                .iter()
                .all(|r| matches!(r.outcome, TaskOutcome::Errored(TaskError::Cancelled(_))))
        );
    }
}
