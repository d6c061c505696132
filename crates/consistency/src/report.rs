//! Sweep report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One worker's completed share of the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Zero-based index of the worker among the configured thread pool.
    pub thread_index: usize,
    /// Warehouses that passed all checks.
    pub warehouses_checked: u64,
    /// Individual check evaluations performed.
    pub checks_executed: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Complete sweep summary, aggregated across workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Configured warehouse range, `[1, warehouse_count]`.
    pub warehouse_count: u32,
    pub thread_count: usize,
    /// Total warehouses that passed all checks.
    pub warehouses_checked: u64,
    /// Total check evaluations performed.
    pub checks_executed: u64,
    /// Per-worker breakdown; workers that failed have no entry.
    pub workers: Vec<WorkerReport>,
    /// First error per failed worker, in worker order.
    pub errors: Vec<String>,
    pub success: bool,
}

impl SweepReport {
    /// Aggregate worker results into a sweep summary.
    pub fn aggregate(
        warehouse_count: u32,
        thread_count: usize,
        started_at: DateTime<Utc>,
        workers: Vec<WorkerReport>,
        errors: Vec<String>,
    ) -> Self {
        let warehouses_checked = workers.iter().map(|w| w.warehouses_checked).sum();
        let checks_executed = workers.iter().map(|w| w.checks_executed).sum();
        let success = errors.is_empty();

        SweepReport {
            started_at,
            completed_at: Utc::now(),
            warehouse_count,
            thread_count,
            warehouses_checked,
            checks_executed,
            workers,
            errors,
            success,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let elapsed = self.completed_at - self.started_at;
        if self.is_success() {
            format!(
                "Consistency sweep PASSED: {} checks across {} warehouses in {}ms",
                self.checks_executed,
                self.warehouses_checked,
                elapsed.num_milliseconds()
            )
        } else {
            format!(
                "Consistency sweep FAILED: {} worker error(s), first: {}",
                self.errors.len(),
                self.errors.first().map(String::as_str).unwrap_or("unknown")
            )
        }
    }
}
