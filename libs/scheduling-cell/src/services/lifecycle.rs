// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::scheduling::AppointmentStatus;

use crate::models::SchedulingError;

pub struct LifecycleService;

impl LifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !self.valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(SchedulingError::InvalidTransition(current));
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::InProgress,
                // Expiration promotes an overdue confirmed appointment
                // straight to completed.
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::InProgress => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }
}

impl Default for LifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use AppointmentStatus::*;

    #[test]
    fn happy_path_chain_is_legal() {
        let lifecycle = LifecycleService::new();
        assert!(lifecycle.validate_transition(Scheduled, Confirmed).is_ok());
        assert!(lifecycle.validate_transition(Confirmed, InProgress).is_ok());
        assert!(lifecycle.validate_transition(InProgress, Completed).is_ok());
    }

    #[test]
    fn check_in_requires_prior_confirmation() {
        let lifecycle = LifecycleService::new();
        assert_matches!(
            lifecycle.validate_transition(Scheduled, InProgress),
            Err(SchedulingError::InvalidTransition(Scheduled))
        );
    }

    #[test]
    fn every_non_terminal_status_can_cancel_or_no_show() {
        let lifecycle = LifecycleService::new();
        for current in [Scheduled, Confirmed, InProgress] {
            assert!(lifecycle.validate_transition(current, Cancelled).is_ok());
            assert!(lifecycle.validate_transition(current, NoShow).is_ok());
        }
    }

    #[test]
    fn terminal_states_are_permanent() {
        let lifecycle = LifecycleService::new();
        for current in [Completed, Cancelled, NoShow] {
            assert!(lifecycle.valid_transitions(current).is_empty());
        }
    }
}
