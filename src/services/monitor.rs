use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use super::{MedicinService, StockService};
use crate::error::ServiceError;

/// Outcome of one stock check.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub expiry_alerts: usize,
    pub low_stock: usize,
}

/// Periodic check for lots nearing their expiration date and for medicines
/// at or below their alert threshold.
#[derive(Clone)]
pub struct StockMonitor {
    medicins: MedicinService,
    stock: StockService,
    expiry_window_days: i64,
}

impl StockMonitor {
    pub fn new(medicins: MedicinService, stock: StockService, expiry_window_days: i64) -> Self {
        Self {
            medicins,
            stock,
            expiry_window_days,
        }
    }

    /// Runs the check once against today's local date.
    ///
    /// Expiring lots get an `EXPIRATION` alert (at most one open alert per
    /// lot). Low-stock medicines are only logged.
    ///
    /// Returns:
    /// - `Ok(CheckReport)` with the number of new alerts and low-stock medicines.
    /// - `Err(ServiceError)` if a store call fails.
    pub async fn run_once(&self) -> Result<CheckReport, ServiceError> {
        let today = Local::now().date_naive();
        let raised = self
            .stock
            .raise_expiry_alerts(today, self.expiry_window_days)
            .await?;

        let low = self.medicins.low_stock(None).await?;
        for medicin in &low {
            log::warn!(
                "Stock faible: {} (id {}) quantité {} / seuil {}",
                medicin.name.as_deref().unwrap_or("?"),
                medicin.id,
                medicin.quantity.unwrap_or_default(),
                medicin.seuil_alerte.unwrap_or_default(),
            );
        }

        Ok(CheckReport {
            expiry_alerts: raised.len(),
            low_stock: low.len(),
        })
    }

    /// Starts a scheduler running [`StockMonitor::run_once`] on `cron`.
    ///
    /// Parameters:
    /// - `cron`: Six-field expression, seconds first (`0 0 8 * * *` is daily at 8:00).
    ///
    /// Returns:
    /// - `Ok(JobScheduler)`: the running scheduler. Dropping it does not stop
    ///   the job; call `shutdown` for that.
    /// - `Err(JobSchedulerError)` if the expression is invalid or the
    ///   scheduler cannot start.
    pub async fn schedule(self, cron: &str) -> Result<JobScheduler, JobSchedulerError> {
        let job = Job::new_async(cron, move |_uuid, _l| {
            let monitor = self.clone();
            Box::pin(async move {
                match monitor.run_once().await {
                    Ok(report) => log::info!(
                        "Stock check done: {} new expiry alert(s), {} low-stock medicin(s)",
                        report.expiry_alerts,
                        report.low_stock
                    ),
                    Err(e) => log::error!("Stock check failed: {}", e),
                }
            })
        })?;

        let sched = JobScheduler::new().await?;
        sched.add(job).await?;
        sched.start().await?;

        log::info!("Stock monitor scheduled ({})", cron);
        Ok(sched)
    }
}
