use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::scheduling::hhmm;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProviderRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequesterRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindowInput {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailabilityInput {
    pub weekday: Weekday,
    pub is_available: bool,
    #[serde(default)]
    pub windows: Vec<TimeWindowInput>,
}

/// Replaces the provider's whole weekly template in one write; days absent
/// from the payload are treated as unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAvailabilityRequest {
    pub days: Vec<DayAvailabilityInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlockedRangeRequest {
    pub weekday: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlockedRangeRequest {
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub is_active: Option<bool>,
}

mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};
    use shared_models::scheduling::parse_hhmm;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(raw) => parse_hhmm(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time: {}", raw))),
            None => Ok(None),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<shared_store::store::StoreError> for ProviderError {
    fn from(err: shared_store::store::StoreError) -> Self {
        match err {
            shared_store::store::StoreError::NotFound(what) => ProviderError::NotFound(what),
            other => ProviderError::Storage(other.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            ProviderError::Validation(msg) => AppError::Validation(msg),
            ProviderError::Storage(msg) => AppError::Storage(msg),
        }
    }
}
