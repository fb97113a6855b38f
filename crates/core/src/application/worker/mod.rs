// Worker - supervised fire-and-forget units of work

pub mod constants;
mod panic_guard;
mod shutdown;

pub use panic_guard::panic_message;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::domain::JobStatus;
use crate::error::Result;
use constants::IN_FLIGHT_POLL_INTERVAL;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// How a background unit ended
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// The unit drove its job to a terminal status
    Finished(JobStatus),
    /// The unit returned an error (e.g. a persistence failure); the job may still be Pending
    Errored(String),
    /// The unit panicked or was aborted
    Panicked(String),
}

/// Report sent by every unit on the supervisor channel
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub url: String,
    pub outcome: UnitOutcome,
    pub duration_ms: u128,
}

/// Create a connected spawner/supervisor pair
pub fn unit_channel() -> (UnitSpawner, Supervisor) {
    let (tx, rx) = mpsc::unbounded_channel();
    let in_flight = Arc::new(AtomicUsize::new(0));
    (
        UnitSpawner {
            tx,
            in_flight: Arc::clone(&in_flight),
        },
        Supervisor { rx, in_flight },
    )
}

/// Launches background units without awaiting them
#[derive(Clone)]
pub struct UnitSpawner {
    tx: mpsc::UnboundedSender<UnitReport>,
    in_flight: Arc<AtomicUsize>,
}

impl UnitSpawner {
    /// Spawn a unit for `url`
    ///
    /// The unit runs in its own tokio task so a panic is caught by its JoinHandle and
    /// reported instead of tearing down the caller.
    pub fn spawn<F>(&self, url: impl Into<String>, unit: F)
    where
        F: Future<Output = Result<JobStatus>> + Send + 'static,
    {
        let url = url.into();
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = match tokio::spawn(unit).await {
                Ok(Ok(status)) => UnitOutcome::Finished(status),
                Ok(Err(e)) => UnitOutcome::Errored(e.to_string()),
                Err(join_err) if join_err.is_panic() => {
                    UnitOutcome::Panicked(panic_message(join_err.into_panic()))
                }
                Err(join_err) => UnitOutcome::Panicked(join_err.to_string()),
            };
            let report = UnitReport {
                url,
                outcome,
                duration_ms: started.elapsed().as_millis(),
            };
            // No supervisor listening: log here so the outcome is never lost
            if let Err(unsent) = tx.send(report) {
                log_report(&unsent.0);
            }
            // Decrement only after the report is queued so drain never misses it
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Number of units spawned but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Receives unit reports; the single place background failures are logged
pub struct Supervisor {
    rx: mpsc::UnboundedReceiver<UnitReport>,
    in_flight: Arc<AtomicUsize>,
}

impl Supervisor {
    /// Wait for the next unit report
    pub async fn next_report(&mut self) -> Option<UnitReport> {
        self.rx.recv().await
    }

    /// Run the supervision loop until shutdown
    ///
    /// On shutdown, waits up to `grace` for in-flight units and logs their reports.
    pub async fn run(mut self, mut shutdown: ShutdownToken, grace: Duration) {
        info!("Supervisor started");
        loop {
            tokio::select! {
                report = self.rx.recv() => match report {
                    Some(report) => log_report(&report),
                    None => break,
                },
                _ = shutdown.wait() => {
                    info!("Supervisor shutting down");
                    break;
                }
            }
        }
        self.drain(grace).await;
        info!("Supervisor stopped");
    }

    async fn drain(&mut self, grace: Duration) {
        let deadline = Instant::now() + grace;
        loop {
            while let Ok(report) = self.rx.try_recv() {
                log_report(&report);
            }
            let remaining = self.in_flight.load(Ordering::SeqCst);
            if remaining == 0 {
                return;
            }
            if Instant::now() >= deadline {
                warn!(
                    in_flight = remaining,
                    "Units still running at shutdown, their jobs stay pending"
                );
                return;
            }
            tokio::time::sleep(IN_FLIGHT_POLL_INTERVAL).await;
        }
    }
}

fn log_report(report: &UnitReport) {
    match &report.outcome {
        UnitOutcome::Finished(status) => info!(
            url = %report.url,
            status = %status,
            duration_ms = report.duration_ms as u64,
            "Scrape unit finished"
        ),
        UnitOutcome::Errored(e) => error!(
            url = %report.url,
            error = %e,
            duration_ms = report.duration_ms as u64,
            "Scrape unit failed"
        ),
        UnitOutcome::Panicked(msg) => error!(
            url = %report.url,
            panic_msg = %msg,
            "Scrape unit panicked"
        ),
    }
}
