use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::scheduling::{
    Appointment, AppointmentStatus, BlockedRange, ProviderProfile, RequesterProfile,
    RescheduleRecord, WeeklyAvailability, APPOINTMENT_ID_PREFIX,
};

use crate::store::{BlockedRangePatch, NewAppointment, SchedulingStore, StoreError};

#[derive(Default)]
struct Inner {
    providers: HashMap<Uuid, ProviderProfile>,
    requesters: HashMap<Uuid, RequesterProfile>,
    availability: HashMap<Uuid, WeeklyAvailability>,
    blocked_ranges: HashMap<Uuid, BlockedRange>,
    appointments: HashMap<String, Appointment>,
    id_sequences: HashMap<NaiveDate, u32>,
}

impl Inner {
    fn next_appointment_id(&mut self, date: NaiveDate) -> String {
        let seq = self.id_sequences.entry(date).or_insert(0);
        *seq += 1;
        format!("{}{}{:04}", APPOINTMENT_ID_PREFIX, date.format("%Y%m%d"), seq)
    }

    /// True when a non-terminal appointment already occupies the exact
    /// (provider, date, time) slot. Terminal rows never block a slot.
    fn slot_taken(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Option<&str>,
    ) -> bool {
        self.appointments.values().any(|apt| {
            apt.provider_id == provider_id
                && apt.date == date
                && apt.time == time
                && !apt.status.is_terminal()
                && exclude_id != Some(apt.id.as_str())
        })
    }
}

/// In-process store on a single `RwLock`. Every mutation that must be atomic
/// with respect to the double-booking invariant runs its check inside the
/// write guard, so two concurrent bookings for the same slot cannot both
/// pass.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn get_provider(&self, id: Uuid) -> Result<ProviderProfile, StoreError> {
        let inner = self.inner.read().await;
        inner
            .providers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("provider".to_string()))
    }

    async fn get_requester(&self, id: Uuid) -> Result<RequesterProfile, StoreError> {
        let inner = self.inner.read().await;
        inner
            .requesters
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("requester".to_string()))
    }

    async fn upsert_provider(&self, profile: ProviderProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.providers.insert(profile.id, profile);
        Ok(())
    }

    async fn upsert_requester(&self, profile: RequesterProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.requesters.insert(profile.id, profile);
        Ok(())
    }

    async fn get_availability(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<WeeklyAvailability>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.availability.get(&provider_id).cloned())
    }

    async fn put_availability(&self, availability: WeeklyAvailability) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .availability
            .insert(availability.provider_id, availability);
        Ok(())
    }

    async fn create_blocked_range(&self, range: BlockedRange) -> Result<BlockedRange, StoreError> {
        let mut inner = self.inner.write().await;
        inner.blocked_ranges.insert(range.id, range.clone());
        Ok(range)
    }

    async fn get_blocked_range(&self, id: Uuid) -> Result<BlockedRange, StoreError> {
        let inner = self.inner.read().await;
        inner
            .blocked_ranges
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("blocked range".to_string()))
    }

    async fn update_blocked_range(
        &self,
        id: Uuid,
        patch: BlockedRangePatch,
    ) -> Result<BlockedRange, StoreError> {
        let mut inner = self.inner.write().await;
        let range = inner
            .blocked_ranges
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("blocked range".to_string()))?;

        if let Some(start_time) = patch.start_time {
            range.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            range.end_time = end_time;
        }
        if let Some(reason) = patch.reason {
            range.reason = reason;
        }
        if let Some(is_active) = patch.is_active {
            range.is_active = is_active;
        }

        Ok(range.clone())
    }

    async fn list_blocked_ranges(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<BlockedRange>, StoreError> {
        let inner = self.inner.read().await;
        let mut ranges: Vec<BlockedRange> = inner
            .blocked_ranges
            .values()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect();
        ranges.sort_by_key(|r| (r.weekday.num_days_from_monday(), r.start_time));
        Ok(ranges)
    }

    async fn active_blocked_ranges(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<BlockedRange>, StoreError> {
        let inner = self.inner.read().await;
        let mut ranges: Vec<BlockedRange> = inner
            .blocked_ranges
            .values()
            .filter(|r| r.provider_id == provider_id && r.weekday == weekday && r.is_active)
            .cloned()
            .collect();
        ranges.sort_by_key(|r| r.start_time);
        Ok(ranges)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;

        // Reservation check and insert under one guard.
        if inner.slot_taken(new.provider_id, new.date, new.time, None) {
            return Err(StoreError::SlotTaken);
        }

        let now = Utc::now();
        let id = inner.next_appointment_id(new.date);
        let appointment = Appointment {
            id: id.clone(),
            requester_id: new.requester_id,
            provider_id: new.provider_id,
            date: new.date,
            time: new.time,
            duration_minutes: new.duration_minutes,
            appointment_type: new.appointment_type,
            reason: new.reason,
            symptoms: new.symptoms,
            status: AppointmentStatus::Scheduled,
            cancellation: None,
            reschedule: None,
            checked_in_at: None,
            checked_out_at: None,
            provider_notes: None,
            rating: None,
            created_at: now,
            updated_at: now,
        };

        inner.appointments.insert(id.clone(), appointment.clone());
        debug!("Appointment {} reserved at {} {}", id, new.date, new.time);
        Ok(appointment)
    }

    async fn move_appointment(
        &self,
        id: &str,
        new_date: NaiveDate,
        new_time: NaiveTime,
        reason: Option<String>,
    ) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;

        let (provider_id, previous_date, previous_time) = {
            let apt = inner
                .appointments
                .get(id)
                .ok_or_else(|| StoreError::NotFound("appointment".to_string()))?;
            (apt.provider_id, apt.date, apt.time)
        };

        // The moved appointment must not conflict with itself.
        if inner.slot_taken(provider_id, new_date, new_time, Some(id)) {
            return Err(StoreError::SlotTaken);
        }

        let apt = inner
            .appointments
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound("appointment".to_string()))?;
        apt.date = new_date;
        apt.time = new_time;
        apt.reschedule = Some(RescheduleRecord {
            previous_date,
            previous_time,
            reason,
        });
        apt.updated_at = Utc::now();

        Ok(apt.clone())
    }

    async fn get_appointment(&self, id: &str) -> Result<Appointment, StoreError> {
        let inner = self.inner.read().await;
        inner
            .appointments
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("appointment".to_string()))
    }

    async fn update_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound("appointment".to_string()));
        }
        inner
            .appointments
            .insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    async fn update_many(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for appointment in appointments {
            inner
                .appointments
                .insert(appointment.id.clone(), appointment.clone());
        }
        Ok(())
    }

    async fn list_for_provider_on(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|apt| apt.provider_id == provider_id && apt.date == date)
            .cloned()
            .collect();
        appointments.sort_by_key(|apt| apt.time);
        Ok(appointments)
    }

    async fn list_for_requester(&self, requester_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|apt| apt.requester_id == requester_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|apt| (apt.date, apt.time));
        Ok(appointments)
    }

    async fn list_for_provider(&self, provider_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|apt| apt.provider_id == provider_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|apt| (apt.date, apt.time));
        Ok(appointments)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut due: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|apt| {
                matches!(
                    apt.status,
                    AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
                ) && apt.start_instant() < now
            })
            .cloned()
            .collect();
        due.sort_by_key(|apt| (apt.date, apt.time));
        Ok(due)
    }

    async fn recompute_provider_rating(
        &self,
        provider_id: Uuid,
    ) -> Result<ProviderProfile, StoreError> {
        let mut inner = self.inner.write().await;

        let scores: Vec<u8> = inner
            .appointments
            .values()
            .filter(|apt| {
                apt.provider_id == provider_id && apt.status == AppointmentStatus::Completed
            })
            .filter_map(|apt| apt.rating.as_ref().map(|r| r.score))
            .collect();

        let profile = inner
            .providers
            .get_mut(&provider_id)
            .ok_or_else(|| StoreError::NotFound("provider".to_string()))?;

        profile.rating_count = scores.len() as i32;
        profile.rating_avg = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| s as f32).sum::<f32>() / scores.len() as f32
        };

        debug!(
            "Provider {} rating recomputed: {:.2} over {} appointments",
            provider_id, profile.rating_avg, profile.rating_count
        );
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::scheduling::AppointmentType;

    fn new_booking(provider_id: Uuid, hour: u32) -> NewAppointment {
        NewAppointment {
            requester_id: Uuid::new_v4(),
            provider_id,
            date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            duration_minutes: 30,
            appointment_type: AppointmentType::GeneralConsultation,
            reason: "check".to_string(),
            symptoms: vec![],
        }
    }

    #[tokio::test]
    async fn insert_rejects_taken_slot() {
        let store = InMemoryStore::new();
        let provider_id = Uuid::new_v4();

        store.insert_appointment(new_booking(provider_id, 10)).await.unwrap();
        let second = store.insert_appointment(new_booking(provider_id, 10)).await;

        assert_matches!(second, Err(StoreError::SlotTaken));
    }

    #[tokio::test]
    async fn terminal_rows_free_the_slot() {
        let store = InMemoryStore::new();
        let provider_id = Uuid::new_v4();

        let mut first = store.insert_appointment(new_booking(provider_id, 10)).await.unwrap();
        first.status = AppointmentStatus::Cancelled;
        store.update_appointment(first).await.unwrap();

        assert!(store.insert_appointment(new_booking(provider_id, 10)).await.is_ok());
    }

    #[tokio::test]
    async fn appointment_ids_sequence_within_date() {
        let store = InMemoryStore::new();
        let provider_id = Uuid::new_v4();

        let first = store.insert_appointment(new_booking(provider_id, 9)).await.unwrap();
        let second = store.insert_appointment(new_booking(provider_id, 10)).await.unwrap();

        assert_eq!(first.id, "APT202609070001");
        assert_eq!(second.id, "APT202609070002");
    }

    #[tokio::test]
    async fn list_due_returns_only_overdue_open_appointments() {
        let store = InMemoryStore::new();
        let provider_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let now = shared_models::scheduling::start_instant(
            date,
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );

        let overdue_scheduled = store.insert_appointment(new_booking(provider_id, 9)).await.unwrap();

        let mut overdue_confirmed = store.insert_appointment(new_booking(provider_id, 10)).await.unwrap();
        overdue_confirmed.status = AppointmentStatus::Confirmed;
        store.update_appointment(overdue_confirmed.clone()).await.unwrap();

        let mut in_progress = store.insert_appointment(new_booking(provider_id, 8)).await.unwrap();
        in_progress.status = AppointmentStatus::InProgress;
        store.update_appointment(in_progress).await.unwrap();

        let mut completed = store.insert_appointment(new_booking(provider_id, 7)).await.unwrap();
        completed.status = AppointmentStatus::Completed;
        store.update_appointment(completed).await.unwrap();

        // Starting exactly now is not yet due; future rows never are.
        store.insert_appointment(new_booking(provider_id, 12)).await.unwrap();
        store.insert_appointment(new_booking(provider_id, 13)).await.unwrap();

        let due = store.list_due(now).await.unwrap();
        let ids: Vec<&str> = due.iter().map(|apt| apt.id.as_str()).collect();
        assert_eq!(ids, vec![overdue_scheduled.id.as_str(), overdue_confirmed.id.as_str()]);
    }

    #[tokio::test]
    async fn move_does_not_conflict_with_itself() {
        let store = InMemoryStore::new();
        let provider_id = Uuid::new_v4();

        let apt = store.insert_appointment(new_booking(provider_id, 10)).await.unwrap();
        let moved = store
            .move_appointment(&apt.id, apt.date, apt.time, None)
            .await
            .unwrap();

        assert_eq!(moved.reschedule.unwrap().previous_time, apt.time);
    }
}
