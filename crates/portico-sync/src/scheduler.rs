//! Interval task scheduling with a per-run timeout.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest accepted frequency. `tokio::time::interval` rejects zero.
const MIN_FREQUENCY: Duration = Duration::from_millis(1);

/// A periodic task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub id: String,
    /// Time between the starts of consecutive runs.
    pub frequency: Duration,
    /// A run still going after this long is abandoned.
    pub timeout: Duration,
}

/// Scheduler task id for a provider, e.g. `run_portico-provider:prod_refresh`.
#[must_use]
pub fn refresh_task_id(provider_name: &str) -> String {
    format!("run_{provider_name}_refresh")
}

/// Runs each scheduled task on its own interval.
///
/// Runs of one task never overlap: each run is awaited (or timed out)
/// before the next tick is taken. Dropping the scheduler cancels every
/// task, including runs in flight.
#[derive(Default)]
pub struct TaskScheduler {
    tasks: JoinSet<()>,
}

impl TaskScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `task` now and then every `definition.frequency`.
    ///
    /// Failures and timeouts are logged with the task id; the schedule
    /// continues either way. Must be called from within a Tokio runtime.
    pub fn schedule_task<F, Fut, E>(&mut self, definition: TaskDefinition, task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        tracing::info!(
            task = %definition.id,
            frequency_ms = duration_millis(definition.frequency),
            timeout_ms = duration_millis(definition.timeout),
            "scheduled task"
        );
        self.tasks.spawn(run_periodically(definition, task));
    }

    /// Number of scheduled tasks still running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task and wait for them to wind down.
    pub async fn shutdown(mut self) {
        self.tasks.shutdown().await;
    }
}

async fn run_periodically<F, Fut, E>(definition: TaskDefinition, mut task: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let mut ticker = tokio::time::interval(definition.frequency.max(MIN_FREQUENCY));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let started = Instant::now();
        match tokio::time::timeout(definition.timeout, task()).await {
            Ok(Ok(())) => tracing::debug!(
                task = %definition.id,
                elapsed_ms = duration_millis(started.elapsed()),
                "task run completed"
            ),
            Ok(Err(error)) => tracing::error!(task = %definition.id, %error, "task run failed"),
            Err(_) => tracing::warn!(
                task = %definition.id,
                timeout_ms = duration_millis(definition.timeout),
                "task run timed out; abandoned"
            ),
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn definition(frequency_secs: u64, timeout_secs: u64) -> TaskDefinition {
        TaskDefinition {
            id: "test-task".into(),
            frequency: Duration::from_secs(frequency_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[test]
    fn task_id_names_the_provider() {
        assert_eq!(
            refresh_task_id("portico-provider:production"),
            "run_portico-provider:production_refresh"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_frequency() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = TaskScheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule_task(definition(60, 5), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        advance(Duration::from_millis(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        advance(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.len(), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_schedule() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = TaskScheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule_task(definition(10, 5), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("catalog unavailable")
            }
        });

        advance(Duration::from_millis(20_010)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_runs_are_abandoned_at_the_timeout() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let mut scheduler = TaskScheduler::new();
        let (s, f) = (Arc::clone(&started), Arc::clone(&finished));
        scheduler.schedule_task(definition(5, 1), move || {
            let (s, f) = (Arc::clone(&s), Arc::clone(&f));
            async move {
                s.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                f.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        advance(Duration::from_millis(6_500)).await;
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let mut scheduler = TaskScheduler::new();
        let (current, max) = (Arc::clone(&in_flight), Arc::clone(&max_seen));
        // Each run takes longer than the frequency.
        scheduler.schedule_task(definition(1, 10), move || {
            let (current, max) = (Arc::clone(&current), Arc::clone(&max));
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(3)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        advance(Duration::from_secs(20)).await;
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_frequency_is_clamped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = TaskScheduler::new();
        let counter = Arc::clone(&runs);
        scheduler.schedule_task(
            TaskDefinition {
                id: "zero".into(),
                frequency: Duration::ZERO,
                timeout: Duration::from_secs(1),
            },
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
        );
        advance(Duration::from_millis(50)).await;
        assert!(runs.load(Ordering::SeqCst) >= 1);
        scheduler.shutdown().await;
    }
}
