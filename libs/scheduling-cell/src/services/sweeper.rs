// libs/scheduling-cell/src/services/sweeper.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use shared_models::scheduling::{
    Appointment, AppointmentStatus, CancelActor, CancellationRecord,
};
use shared_store::store::SchedulingStore;

/// Reason recorded when an unconfirmed appointment lapses past its start.
pub const EXPIRED_UNCONFIRMED_REASON: &str = "time passed without confirmation";

/// Rewrites statuses of appointments whose start instant has passed.
/// Confirmed rows are promoted to completed; scheduled rows are demoted
/// to cancelled with a system cancellation record. Returns the number of
/// rows changed. Applying the sweep twice is a no-op the second time.
pub fn sweep_statuses(appointments: &mut [Appointment], now: DateTime<Utc>) -> usize {
    let mut changed = 0;
    for appointment in appointments.iter_mut() {
        if appointment.start_instant() >= now {
            continue;
        }
        match appointment.status {
            AppointmentStatus::Confirmed => {
                appointment.status = AppointmentStatus::Completed;
                appointment.updated_at = now;
                changed += 1;
            }
            AppointmentStatus::Scheduled => {
                appointment.status = AppointmentStatus::Cancelled;
                appointment.cancellation = Some(CancellationRecord {
                    reason: EXPIRED_UNCONFIRMED_REASON.to_string(),
                    actor: CancelActor::System,
                    cancelled_at: now,
                });
                appointment.updated_at = now;
                changed += 1;
            }
            _ => {}
        }
    }
    changed
}

/// Expires stale appointments, both from the periodic background task
/// and inline whenever appointments are read back.
#[derive(Clone)]
pub struct ExpirationSweeper {
    store: Arc<dyn SchedulingStore>,
}

impl ExpirationSweeper {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Sweeps the given rows and persists the changed ones in one batch.
    /// Persistence is best effort: a store failure is logged and the
    /// swept in-memory copies are still returned, so readers always see
    /// settled statuses. The next sweep retries the write.
    pub async fn sweep(
        &self,
        mut appointments: Vec<Appointment>,
        now: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let changed = sweep_statuses(&mut appointments, now);
        if changed == 0 {
            return appointments;
        }

        let stale: Vec<Appointment> = appointments
            .iter()
            .filter(|a| a.updated_at == now && a.is_terminal())
            .cloned()
            .collect();

        debug!(count = changed, "expiring stale appointments");
        if let Err(e) = self.store.update_many(&stale).await {
            error!("failed to persist expired appointment statuses: {}", e);
        }
        appointments
    }

    /// Background expiration loop. Wakes on a fixed interval, asks the
    /// store for rows that started before now, and sweeps them.
    pub async fn run_periodic(self, interval_seconds: u64) {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval_seconds.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval_seconds, "expiration sweeper started");
        loop {
            ticker.tick().await;
            let now = Utc::now();
            match self.store.list_due(now).await {
                Ok(due) if !due.is_empty() => {
                    self.sweep(due, now).await;
                }
                Ok(_) => {}
                Err(e) => error!("expiration sweeper could not list due appointments: {}", e),
            }
        }
    }
}
