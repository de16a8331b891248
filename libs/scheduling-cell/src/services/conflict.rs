// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::scheduling::start_instant;
use shared_store::store::SchedulingStore;
use shared_store::AppState;

use crate::models::SchedulingError;

pub struct ConflictDetectionService {
    store: Arc<dyn SchedulingStore>,
}

impl ConflictDetectionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    /// Validate a requested (provider, date, time) before commit. The same
    /// checks serve booking and rescheduling; a reschedule passes its own id
    /// as `exclude_id` so the appointment does not conflict with itself.
    ///
    /// These are advisory pre-checks for precise error messages; the store's
    /// insert/move re-runs the uniqueness check atomically and remains the
    /// final authority under concurrency.
    pub async fn ensure_bookable(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        debug!(
            "Checking bookability for provider {} at {} {}",
            provider_id, date, time
        );

        if start_instant(date, time) <= now {
            return Err(SchedulingError::Temporal(
                "requested time is not in the future".to_string(),
            ));
        }

        let existing = self.store.list_for_provider_on(provider_id, date).await?;
        let taken = existing.iter().any(|apt| {
            apt.time == time && !apt.status.is_terminal() && exclude_id != Some(apt.id.as_str())
        });
        if taken {
            warn!(
                "Booking conflict for provider {} at {} {}",
                provider_id, date, time
            );
            return Err(SchedulingError::Conflict("slot already booked".to_string()));
        }

        let blocked = self
            .store
            .active_blocked_ranges(provider_id, date.weekday())
            .await?;
        if blocked.iter().any(|range| range.covers(time)) {
            warn!(
                "Blocked-range conflict for provider {} at {} {}",
                provider_id, date, time
            );
            return Err(SchedulingError::Conflict(
                "slot blocked by provider".to_string(),
            ));
        }

        Ok(())
    }
}
