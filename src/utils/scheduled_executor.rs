// Scheduled Executor for periodic tasks
// Runs one task on a fixed interval on the tokio runtime

use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Longest uninterrupted sleep, so a shutdown request is noticed promptly
const SHUTDOWN_POLL: Duration = Duration::from_millis(500);

/// A trait for tasks that run periodically
pub trait ScheduledTask: Send + Sync + 'static {
    /// Execute the task
    /// Returns Ok(()) on success, Err on failure
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send + '_>>;

    /// Check if the task should terminate
    /// Default: never terminate (run forever)
    fn should_terminate(&self) -> bool {
        false
    }
}

impl<T: ScheduledTask> ScheduledTask for Arc<T> {
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send + '_>> {
        (**self).run()
    }

    fn should_terminate(&self) -> bool {
        (**self).should_terminate()
    }
}

/// Scheduled executor for running periodic tasks
pub struct ScheduledExecutor {
    interval: Duration,
    task_name: String,
    run_on_startup: bool,
    shutdown: Arc<AtomicBool>,
}

impl ScheduledExecutor {
    /// Create a new scheduled executor
    ///
    /// # Arguments
    /// * `task_name` - Name of the task (for logging)
    /// * `interval` - Interval between executions
    pub fn new(task_name: impl Into<String>, interval: Duration) -> Self {
        Self {
            task_name: task_name.into(),
            interval,
            run_on_startup: false,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the first execution immediately instead of after one interval
    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    /// Flag that stops the loop once set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Start the scheduled task
    ///
    /// Runs the task periodically until:
    /// - the shutdown handle is set
    /// - the task's `should_terminate()` returns true
    ///
    /// A failed run is logged and the schedule continues.
    ///
    /// # Example
    /// ```ignore
    /// let executor = ScheduledExecutor::new("diagnostic-report", Duration::from_secs(300));
    /// let handle = executor.shutdown_handle();
    /// tokio::spawn(executor.start(task));
    ///
    /// // Later, to stop:
    /// handle.store(true, Ordering::Relaxed);
    /// ```
    pub async fn start<T>(self, task: T)
    where
        T: ScheduledTask,
    {
        let task_name = self.task_name.clone();
        let interval_ms = self.interval.as_millis() as i64;
        let shutdown = self.shutdown;

        tracing::info!(
            "Starting scheduled task '{}' with interval: {:?} (run on startup: {})",
            task_name,
            self.interval,
            self.run_on_startup
        );

        let mut next_execution = Utc::now().timestamp_millis();
        if !self.run_on_startup {
            next_execution += interval_ms;
        }

        loop {
            if shutdown.load(Ordering::Relaxed) || task.should_terminate() {
                tracing::info!("Scheduled task '{}' is shutting down", task_name);
                break;
            }

            let now = Utc::now().timestamp_millis();

            if now >= next_execution {
                tracing::debug!("Executing scheduled task '{}'", task_name);

                match task.run().await {
                    Ok(()) => {
                        tracing::debug!("Scheduled task '{}' completed successfully", task_name);
                    },
                    Err(e) => {
                        tracing::error!("Scheduled task '{}' failed: {:#}", task_name, e);
                    },
                }

                next_execution = Utc::now().timestamp_millis() + interval_ms;
                continue;
            }

            let wait_ms = next_execution.saturating_sub(now).max(0) as u64;
            sleep(Duration::from_millis(wait_ms).min(SHUTDOWN_POLL)).await;
        }

        tracing::info!("Scheduled task '{}' stopped", task_name);
    }
}
