use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// APPOINTMENT
// ==============================================================================

/// Prefix of every generated appointment id: `APT` + `YYYYMMDD` + zero-padded
/// sequence number unique within that date, e.g. `APT202608310007`.
pub const APPOINTMENT_ID_PREFIX: &str = "APT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub reason: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub status: AppointmentStatus,
    pub cancellation: Option<CancellationRecord>,
    pub reschedule: Option<RescheduleRecord>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub provider_notes: Option<String>,
    pub rating: Option<RatingRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The scheduled start as an absolute instant. All lead-time and
    /// expiration comparisons go through this so date/time inputs are
    /// normalized once.
    pub fn start_instant(&self) -> DateTime<Utc> {
        start_instant(self.date, self.time)
    }

    pub fn scheduled_end_instant(&self) -> DateTime<Utc> {
        self.start_instant() + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

pub fn start_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Serde adapter for the wire format of times: 24-hour `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time: {}", raw)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses are permanent end-of-life markers; records are never
    /// deleted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[serde(alias = "consultation", alias = "general")]
    GeneralConsultation,
    #[serde(alias = "followup")]
    FollowUp,
    #[serde(alias = "checkup")]
    CheckUp,
    #[serde(alias = "urgent")]
    Urgent,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::GeneralConsultation => write!(f, "general_consultation"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::CheckUp => write!(f, "check_up"),
            AppointmentType::Urgent => write!(f, "urgent"),
        }
    }
}

// ==============================================================================
// AUDIT RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub reason: String,
    pub actor: CancelActor,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    Requester,
    Provider,
    Admin,
    System,
}

/// Only the immediately preceding slot is retained; a second reschedule
/// replaces this record rather than appending to a history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRecord {
    pub previous_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub previous_time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub score: u8,
    pub review: Option<String>,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

/// A single `[start, end)` window within one weekday, `HH:MM` resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub weekday: Weekday,
    pub is_available: bool,
    pub windows: Vec<TimeWindow>,
}

/// A provider's recurring weekly template. Windows are caller-curated; the
/// slot generator does not merge overlapping windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub provider_id: Uuid,
    pub days: Vec<DayAvailability>,
}

impl WeeklyAvailability {
    pub fn day(&self, weekday: Weekday) -> Option<&DayAvailability> {
        self.days.iter().find(|d| d.weekday == weekday)
    }
}

/// A recurring weekly exception ("every Monday lunch"), keyed by weekday
/// rather than a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedRange {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub weekday: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub reason: String,
    pub is_active: bool,
}

impl BlockedRange {
    /// Membership over the half-open interval `[start_time, end_time)`.
    pub fn covers(&self, time: NaiveTime) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

// ==============================================================================
// DIRECTORY PROFILES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub display_name: String,
    pub rating_avg: f32,
    pub rating_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequesterProfile {
    pub id: Uuid,
    pub display_name: String,
}
