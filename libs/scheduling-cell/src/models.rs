// libs/scheduling-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::actor::Actor;
use shared_models::error::AppError;
use shared_models::scheduling::{hhmm, AppointmentStatus, AppointmentType};
use shared_store::store::StoreError;

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub appointment_type: AppointmentType,
    pub duration_minutes: Option<i32>,
    pub reason: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub provider_id: Uuid,
    pub date: NaiveDate,
}

/// One candidate start time in the slot listing for a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub actor: Actor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub actor: Actor,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub actor: Actor,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub actor: Actor,
    pub new_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub new_time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateAppointmentRequest {
    pub actor: Actor,
    pub score: u8,
    pub review: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Temporal(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid status transition from {0}")]
    InvalidTransition(AppointmentStatus),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => SchedulingError::NotFound(what),
            StoreError::SlotTaken => SchedulingError::Conflict("slot already booked".to_string()),
            other => SchedulingError::Storage(other.to_string()),
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(msg) => AppError::Validation(msg),
            SchedulingError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            SchedulingError::Conflict(msg) => AppError::Conflict(msg),
            SchedulingError::Temporal(msg) => AppError::Temporal(msg),
            SchedulingError::Authorization(msg) => AppError::Authorization(msg),
            SchedulingError::InvalidTransition(status) => {
                AppError::Conflict(format!("invalid status transition from {}", status))
            }
            SchedulingError::Storage(msg) => AppError::Storage(msg),
        }
    }
}
