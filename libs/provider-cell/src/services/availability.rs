use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_store::store::{BlockedRangePatch, SchedulingStore};
use shared_store::AppState;

use shared_models::scheduling::{
    BlockedRange, DayAvailability, TimeWindow, WeeklyAvailability,
};

use crate::models::{
    CreateBlockedRangeRequest, ProviderError, UpdateBlockedRangeRequest, UpsertAvailabilityRequest,
};

pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    /// Replace a provider's weekly recurring template. Windows are validated
    /// but deliberately not merged; overlap curation is the caller's job.
    pub async fn set_weekly_availability(
        &self,
        provider_id: Uuid,
        request: UpsertAvailabilityRequest,
    ) -> Result<WeeklyAvailability, ProviderError> {
        debug!("Replacing weekly availability for provider {}", provider_id);

        self.store.get_provider(provider_id).await?;

        let mut days = Vec::with_capacity(request.days.len());
        for day in request.days {
            let mut windows = Vec::with_capacity(day.windows.len());
            for window in day.windows {
                if window.start >= window.end {
                    return Err(ProviderError::Validation(format!(
                        "window start {} must be before end {}",
                        window.start.format("%H:%M"),
                        window.end.format("%H:%M")
                    )));
                }
                windows.push(TimeWindow {
                    start: window.start,
                    end: window.end,
                });
            }
            days.push(DayAvailability {
                weekday: day.weekday,
                is_available: day.is_available,
                windows,
            });
        }

        let availability = WeeklyAvailability { provider_id, days };
        self.store.put_availability(availability.clone()).await?;
        Ok(availability)
    }

    /// A provider that never configured a template reads back as an empty
    /// one; callers render "not available" rather than an error.
    pub async fn get_weekly_availability(
        &self,
        provider_id: Uuid,
    ) -> Result<WeeklyAvailability, ProviderError> {
        self.store.get_provider(provider_id).await?;

        Ok(self
            .store
            .get_availability(provider_id)
            .await?
            .unwrap_or(WeeklyAvailability {
                provider_id,
                days: Vec::new(),
            }))
    }

    pub async fn create_blocked_range(
        &self,
        provider_id: Uuid,
        request: CreateBlockedRangeRequest,
    ) -> Result<BlockedRange, ProviderError> {
        debug!(
            "Creating blocked range for provider {} on {:?}",
            provider_id, request.weekday
        );

        self.store.get_provider(provider_id).await?;
        validate_range(&request)?;

        let range = BlockedRange {
            id: Uuid::new_v4(),
            provider_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            reason: request.reason,
            is_active: true,
        };

        Ok(self.store.create_blocked_range(range).await?)
    }

    pub async fn update_blocked_range(
        &self,
        range_id: Uuid,
        request: UpdateBlockedRangeRequest,
    ) -> Result<BlockedRange, ProviderError> {
        // Validate the range the patch would leave behind, so a single-bound
        // update cannot invert start/end.
        let current = self.store.get_blocked_range(range_id).await?;
        let start = request.start_time.unwrap_or(current.start_time);
        let end = request.end_time.unwrap_or(current.end_time);
        if start >= end {
            return Err(ProviderError::Validation(
                "blocked range start must be before end".to_string(),
            ));
        }
        if let Some(ref reason) = request.reason {
            if reason.trim().is_empty() {
                return Err(ProviderError::Validation(
                    "blocked range reason must not be empty".to_string(),
                ));
            }
        }

        let patch = BlockedRangePatch {
            start_time: request.start_time,
            end_time: request.end_time,
            reason: request.reason,
            is_active: request.is_active,
        };

        Ok(self.store.update_blocked_range(range_id, patch).await?)
    }

    pub async fn list_blocked_ranges(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<BlockedRange>, ProviderError> {
        self.store.get_provider(provider_id).await?;
        Ok(self.store.list_blocked_ranges(provider_id).await?)
    }
}

fn validate_range(request: &CreateBlockedRangeRequest) -> Result<(), ProviderError> {
    if request.start_time >= request.end_time {
        return Err(ProviderError::Validation(
            "blocked range start must be before end".to_string(),
        ));
    }
    if request.reason.trim().is_empty() {
        return Err(ProviderError::Validation(
            "blocked range reason must not be empty".to_string(),
        ));
    }
    Ok(())
}
