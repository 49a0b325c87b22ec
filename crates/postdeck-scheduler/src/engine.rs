use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::error::{Result, SweepError};
use crate::sweeper::Sweeper;
use crate::types::SweepReport;

/// Timer-driven sweep loop.
pub struct SweepEngine {
    sweeper: Sweeper,
    period: Duration,
    /// If set, every non-empty report is forwarded here.
    reports_tx: Option<mpsc::Sender<SweepReport>>,
}

impl SweepEngine {
    /// Create an engine that sweeps every `interval_secs` seconds.
    pub fn new(sweeper: Sweeper, interval_secs: u64) -> Result<Self> {
        if interval_secs == 0 {
            return Err(SweepError::InvalidInterval(
                "interval must be at least 1 second".to_string(),
            ));
        }
        Ok(Self {
            sweeper,
            period: Duration::from_secs(interval_secs),
            reports_tx: None,
        })
    }

    /// Forward non-empty sweep reports to `tx`.
    ///
    /// The sender is non-blocking (`try_send`) so the tick loop is never
    /// stalled by a slow consumer.
    pub fn with_reports(mut self, tx: mpsc::Sender<SweepReport>) -> Self {
        self.reports_tx = Some(tx);
        self
    }

    /// Main loop. Runs a catch-up sweep immediately, then one per period,
    /// until `shutdown` broadcasts `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(period_secs = self.period.as_secs(), "sweep engine started");
        // Catch up on posts that fell due while the process was down.
        self.tick();

        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("sweep engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn tick(&self) {
        match self.sweeper.sweep() {
            Ok(report) if report.is_empty() => {}
            Ok(report) => {
                if let Some(ref tx) = self.reports_tx {
                    if tx.try_send(report).is_err() {
                        warn!("sweep report channel full or closed, report dropped");
                    }
                }
            }
            Err(e) => error!("sweep tick error: {e}"),
        }
    }
}
