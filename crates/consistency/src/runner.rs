//! Sweep orchestration for one worker.

use crate::checks::{all_checks, CHECK_COUNT};
use crate::error::CheckError;
use crate::executor::QueryExecutor;
use crate::report::WorkerReport;
use crate::shard::WarehouseShards;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Sweep dimensions, passed explicitly at construction.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Warehouses are checked over the id range `[1, warehouse_count]`.
    pub warehouse_count: u32,
    /// Size of the worker pool the sweep is partitioned across.
    pub thread_count: usize,
}

/// Drives the verification sweep for one worker.
///
/// Workers are fully independent: the strided warehouse partition gives
/// each a disjoint id set, so a single checker can be shared across all
/// worker tasks without locking. The only shared resource is the
/// executor's connection pool.
pub struct ConsistencyChecker {
    executor: Arc<dyn QueryExecutor>,
    config: SweepConfig,
}

impl ConsistencyChecker {
    pub fn new(executor: Arc<dyn QueryExecutor>, config: SweepConfig) -> Self {
        ConsistencyChecker { executor, config }
    }

    pub fn config(&self) -> SweepConfig {
        self.config
    }

    /// Run all twelve checks against every warehouse assigned to
    /// `thread_index`, in ascending (warehouse, check-number) order.
    ///
    /// Fail-fast: the first failure of any kind aborts this worker's
    /// sweep. A query execution failure aborts just the same as a
    /// violated condition; cancellation surfaces as
    /// [`CheckError::Cancelled`].
    pub async fn check(
        &self,
        cancel: &CancellationToken,
        thread_index: usize,
    ) -> Result<WorkerReport, CheckError> {
        let start = Instant::now();
        let mut warehouses_checked = 0u64;
        let mut checks_executed = 0u64;

        let shard = WarehouseShards::new(
            thread_index,
            self.config.thread_count,
            self.config.warehouse_count,
        );

        for warehouse in shard {
            if cancel.is_cancelled() {
                return Err(CheckError::Cancelled);
            }

            for check in all_checks() {
                if cancel.is_cancelled() {
                    return Err(CheckError::Cancelled);
                }
                check.evaluate(self.executor.as_ref(), warehouse).await?;
                checks_executed += 1;
            }

            warehouses_checked += 1;
            debug!(
                "warehouse {} passed all {} consistency checks",
                warehouse, CHECK_COUNT
            );
        }

        info!(
            "worker {} checked {} warehouses in {:.2}s",
            thread_index,
            warehouses_checked,
            start.elapsed().as_secs_f64()
        );

        Ok(WorkerReport {
            thread_index,
            warehouses_checked,
            checks_executed,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
