use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use thiserror::Error;
use uuid::Uuid;

use shared_models::scheduling::{
    Appointment, AppointmentType, BlockedRange, ProviderProfile, RequesterProfile,
    WeeklyAvailability,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("slot already reserved")]
    SlotTaken,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Input for a new booking. Status, id and timestamps are assigned by the
/// store at insertion time.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockedRangePatch {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub is_active: Option<bool>,
}

/// Storage contract for the scheduling engine. The in-memory implementation
/// is the default; a durable backend must honor the same atomicity:
/// `insert_appointment` and `move_appointment` reserve the
/// `(provider_id, date, time)` slot against non-terminal rows in a single
/// step, never as a separate check followed by a write.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    // Directory
    async fn get_provider(&self, id: Uuid) -> Result<ProviderProfile, StoreError>;
    async fn get_requester(&self, id: Uuid) -> Result<RequesterProfile, StoreError>;
    async fn upsert_provider(&self, profile: ProviderProfile) -> Result<(), StoreError>;
    async fn upsert_requester(&self, profile: RequesterProfile) -> Result<(), StoreError>;

    // Availability template
    async fn get_availability(&self, provider_id: Uuid)
        -> Result<Option<WeeklyAvailability>, StoreError>;
    async fn put_availability(&self, availability: WeeklyAvailability) -> Result<(), StoreError>;

    // Blocked ranges
    async fn create_blocked_range(&self, range: BlockedRange) -> Result<BlockedRange, StoreError>;
    async fn get_blocked_range(&self, id: Uuid) -> Result<BlockedRange, StoreError>;
    async fn update_blocked_range(
        &self,
        id: Uuid,
        patch: BlockedRangePatch,
    ) -> Result<BlockedRange, StoreError>;
    async fn list_blocked_ranges(&self, provider_id: Uuid) -> Result<Vec<BlockedRange>, StoreError>;
    async fn active_blocked_ranges(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<BlockedRange>, StoreError>;

    // Appointments
    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError>;
    /// Atomic reschedule: re-checks the target slot and swaps date/time under
    /// the same guard, replacing the reschedule audit with the previous slot.
    async fn move_appointment(
        &self,
        id: &str,
        new_date: NaiveDate,
        new_time: NaiveTime,
        reason: Option<String>,
    ) -> Result<Appointment, StoreError>;
    async fn get_appointment(&self, id: &str) -> Result<Appointment, StoreError>;
    async fn update_appointment(&self, appointment: Appointment)
        -> Result<Appointment, StoreError>;
    /// Single batch write used by the expiration sweeper; best-effort from
    /// the caller's point of view.
    async fn update_many(&self, appointments: &[Appointment]) -> Result<(), StoreError>;
    async fn list_for_provider_on(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn list_for_requester(&self, requester_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    async fn list_for_provider(&self, provider_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    /// Non-terminal appointments whose start instant is strictly before
    /// `now`, for the periodic reconciliation scan.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError>;

    /// Full recomputation of the provider's average over all completed rated
    /// appointments. Implementations must serialize this per provider.
    async fn recompute_provider_rating(
        &self,
        provider_id: Uuid,
    ) -> Result<ProviderProfile, StoreError>;
}
