// libs/scheduling-cell/src/services/policy.rs
use chrono::{DateTime, Duration, Utc};

use shared_config::AppConfig;
use shared_models::scheduling::Appointment;

use crate::models::SchedulingError;

/// Lead-time guards in front of the mutating cancel/reschedule operations.
/// Both predicates read the appointment's current status and current
/// scheduled instant at the moment of the request.
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    cancel_lead: Duration,
    reschedule_lead: Duration,
}

impl SchedulingPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cancel_lead: Duration::hours(config.cancel_lead_hours),
            reschedule_lead: Duration::hours(config.reschedule_lead_hours),
        }
    }

    pub fn can_cancel(&self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        !appointment.is_terminal() && appointment.start_instant() - now > self.cancel_lead
    }

    pub fn can_reschedule(&self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        !appointment.is_terminal() && appointment.start_instant() - now > self.reschedule_lead
    }

    pub fn ensure_can_cancel(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        if self.can_cancel(appointment, now) {
            Ok(())
        } else {
            Err(SchedulingError::Temporal(format!(
                "cancellation requires more than {} hours of lead time",
                self.cancel_lead.num_hours()
            )))
        }
    }

    pub fn ensure_can_reschedule(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        if self.can_reschedule(appointment, now) {
            Ok(())
        } else {
            Err(SchedulingError::Temporal(format!(
                "rescheduling requires more than {} hours of lead time",
                self.reschedule_lead.num_hours()
            )))
        }
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
