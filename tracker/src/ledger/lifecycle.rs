//! Lifecycle simulator
//!
//! Schedules the single `running -> success | failed` transition of a ledger
//! record on a tokio timer. Completions are not durable: a process that exits
//! before the delay elapses never completes the record.

use std::sync::Weak;
use std::time::Duration;

use rand::Rng;
use tokio::task::AbortHandle;
use tracing::debug;

/// Terminal outcome of a simulated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success,
    Failed,
}

/// Kind of record being completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Deploy,
    Rollback,
}

/// Receiver of fired completions
pub trait CompletionTarget: Send + Sync {
    /// Apply the terminal transition to the record with `id`
    fn complete(&self, id: &str, outcome: CompletionOutcome, duration_label: &str);
}

/// Lifecycle settings
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Delay before a deployment completes
    pub deploy_delay: Duration,

    /// Delay before a rollback completes
    pub rollback_delay: Duration,

    /// Duration label stamped on completed deployments
    pub deploy_duration_label: String,

    /// Duration label stamped on completed rollbacks
    pub rollback_duration_label: String,

    /// Probability in [0, 1] that a completion fails
    pub failure_rate: f64,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            deploy_delay: Duration::from_secs(5),
            rollback_delay: Duration::from_secs(4),
            deploy_duration_label: "2m 15s".to_string(),
            rollback_duration_label: "1m 45s".to_string(),
            failure_rate: 0.0,
        }
    }
}

/// Handle to a pending completion
#[derive(Debug)]
pub struct CompletionHandle {
    abort: AbortHandle,
}

impl CompletionHandle {
    /// Cancel the completion; a no-op once it has fired
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Timer-driven completion scheduler
#[derive(Debug, Clone, Default)]
pub struct LifecycleSimulator {
    settings: LifecycleSettings,
}

impl LifecycleSimulator {
    pub fn new(settings: LifecycleSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Schedule the completion of a record using the delay and label for its kind
    pub fn schedule_for(
        &self,
        target: Weak<dyn CompletionTarget>,
        id: String,
        kind: RecordKind,
    ) -> CompletionHandle {
        let (delay, label) = match kind {
            RecordKind::Deploy => (
                self.settings.deploy_delay,
                self.settings.deploy_duration_label.clone(),
            ),
            RecordKind::Rollback => (
                self.settings.rollback_delay,
                self.settings.rollback_duration_label.clone(),
            ),
        };
        self.schedule_completion(target, id, delay, label)
    }

    /// Fire `target.complete(id, ..)` once `delay` has elapsed
    ///
    /// Must be called from within a tokio runtime. The target is held weakly
    /// so a dropped ledger simply lets the timer lapse.
    pub fn schedule_completion(
        &self,
        target: Weak<dyn CompletionTarget>,
        id: String,
        delay: Duration,
        duration_label: String,
    ) -> CompletionHandle {
        let failure_rate = self.settings.failure_rate;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = draw_outcome(failure_rate, &mut rand::thread_rng());
            match target.upgrade() {
                Some(target) => target.complete(&id, outcome, &duration_label),
                None => debug!("Completion target for {} dropped, skipping", id),
            }
        });

        CompletionHandle {
            abort: task.abort_handle(),
        }
    }
}

/// Draw the outcome of a completion
pub fn draw_outcome<R: Rng + ?Sized>(failure_rate: f64, rng: &mut R) -> CompletionOutcome {
    if failure_rate <= 0.0 {
        return CompletionOutcome::Success;
    }
    if rng.gen_bool(failure_rate.min(1.0)) {
        CompletionOutcome::Failed
    } else {
        CompletionOutcome::Success
    }
}
