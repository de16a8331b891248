// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{Datelike, DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::actor::{Actor, ActorRole};
use shared_models::scheduling::{
    Appointment, AppointmentStatus, CancelActor, CancellationRecord, RatingRecord,
};
use shared_store::notify::{NotificationDispatcher, NotificationEvent, NotificationKind};
use shared_store::store::{NewAppointment, SchedulingStore};
use shared_store::AppState;

use crate::models::{
    BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest,
    RateAppointmentRequest, RescheduleAppointmentRequest, SchedulingError, Slot,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::LifecycleService;
use crate::services::policy::SchedulingPolicy;
use crate::services::slots;
use crate::services::sweeper::ExpirationSweeper;

/// Front door of the scheduling cell. Owns the conflict, lifecycle, policy
/// and expiration sub-services and orchestrates them per operation.
pub struct BookingService {
    store: Arc<dyn SchedulingStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    conflict: ConflictDetectionService,
    lifecycle: LifecycleService,
    policy: SchedulingPolicy,
    sweeper: ExpirationSweeper,
    slot_granularity: Duration,
    default_duration_minutes: i32,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            notifier: Arc::clone(&state.notifier),
            conflict: ConflictDetectionService::new(state),
            lifecycle: LifecycleService::new(),
            policy: SchedulingPolicy::from_config(&state.config),
            sweeper: ExpirationSweeper::new(Arc::clone(&state.store)),
            slot_granularity: Duration::minutes(state.config.slot_granularity_minutes),
            default_duration_minutes: state.config.default_duration_minutes,
        }
    }

    // ==========================================================================
    // SLOTS
    // ==========================================================================

    pub async fn get_slots(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let now = Utc::now();
        self.store.get_provider(provider_id).await?;

        // Make sure lapsed bookings stop occupying slots before we compute
        // availability for the day.
        let appointments = self.store.list_for_provider_on(provider_id, date).await?;
        let appointments = self.sweeper.sweep(appointments, now).await;

        let availability = self.store.get_availability(provider_id).await?;
        let blocked = self
            .store
            .active_blocked_ranges(provider_id, date.weekday())
            .await?;

        Ok(slots::generate_slots(
            availability.as_ref(),
            date,
            now,
            self.slot_granularity,
            &appointments,
            &blocked,
        ))
    }

    // ==========================================================================
    // BOOKING
    // ==========================================================================

    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();
        info!(
            "Booking request for provider {} at {} {}",
            request.provider_id, request.date, request.time
        );

        if request.reason.trim().is_empty() {
            return Err(SchedulingError::Validation(
                "reason must not be empty".to_string(),
            ));
        }
        let duration = request.duration_minutes.unwrap_or(self.default_duration_minutes);
        if duration <= 0 {
            return Err(SchedulingError::Validation(
                "duration_minutes must be positive".to_string(),
            ));
        }

        self.store.get_requester(request.requester_id).await?;
        self.store.get_provider(request.provider_id).await?;

        self.conflict
            .ensure_bookable(request.provider_id, request.date, request.time, None, now)
            .await?;

        // The store re-checks the slot under its own guard, so two racing
        // bookings for the same slot cannot both succeed.
        let appointment = self
            .store
            .insert_appointment(NewAppointment {
                requester_id: request.requester_id,
                provider_id: request.provider_id,
                date: request.date,
                time: request.time,
                duration_minutes: duration,
                appointment_type: request.appointment_type,
                reason: request.reason,
                symptoms: request.symptoms,
            })
            .await?;

        info!("Booked appointment {}", appointment.id);
        self.notify(NotificationKind::Booked, &appointment).await;
        Ok(appointment)
    }

    // ==========================================================================
    // READS
    // ==========================================================================

    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, SchedulingError> {
        let appointment = self.store.get_appointment(id).await?;
        let mut swept = self.sweeper.sweep(vec![appointment], Utc::now()).await;
        Ok(swept.remove(0))
    }

    pub async fn list_for_requester(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.get_requester(requester_id).await?;
        let rows = self.store.list_for_requester(requester_id).await?;
        Ok(self.sweeper.sweep(rows, Utc::now()).await)
    }

    pub async fn list_for_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.get_provider(provider_id).await?;
        let rows = self.store.list_for_provider(provider_id).await?;
        Ok(self.sweeper.sweep(rows, Utc::now()).await)
    }

    // ==========================================================================
    // LIFECYCLE TRANSITIONS
    // ==========================================================================

    pub async fn confirm(&self, id: &str, actor: &Actor) -> Result<Appointment, SchedulingError> {
        let appointment = self.get_appointment(id).await?;
        self.authorize_provider_side(&appointment, actor)?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Confirmed)?;

        let mut updated = appointment;
        updated.status = AppointmentStatus::Confirmed;
        updated.updated_at = Utc::now();
        Ok(self.store.update_appointment(updated).await?)
    }

    pub async fn check_in(&self, id: &str, actor: &Actor) -> Result<Appointment, SchedulingError> {
        let appointment = self.get_appointment(id).await?;
        self.authorize_provider_side(&appointment, actor)?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::InProgress)?;

        let now = Utc::now();
        let mut updated = appointment;
        updated.status = AppointmentStatus::InProgress;
        updated.checked_in_at = Some(now);
        updated.updated_at = now;
        Ok(self.store.update_appointment(updated).await?)
    }

    pub async fn complete(
        &self,
        id: &str,
        request: CompleteAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.get_appointment(id).await?;
        self.authorize_provider_side(&appointment, &request.actor)?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Completed)?;

        let now = Utc::now();
        let mut updated = appointment;
        updated.status = AppointmentStatus::Completed;
        updated.checked_out_at = Some(now);
        if request.notes.is_some() {
            updated.provider_notes = request.notes;
        }
        updated.updated_at = now;
        Ok(self.store.update_appointment(updated).await?)
    }

    pub async fn mark_no_show(
        &self,
        id: &str,
        actor: &Actor,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.get_appointment(id).await?;
        self.authorize_provider_side(&appointment, actor)?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::NoShow)?;

        let mut updated = appointment;
        updated.status = AppointmentStatus::NoShow;
        updated.updated_at = Utc::now();
        Ok(self.store.update_appointment(updated).await?)
    }

    // ==========================================================================
    // CANCELLATION / RESCHEDULE
    // ==========================================================================

    pub async fn cancel(
        &self,
        id: &str,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();
        let appointment = self.get_appointment(id).await?;
        self.authorize_party(&appointment, &request.actor)?;

        if request.reason.trim().is_empty() {
            return Err(SchedulingError::Validation(
                "cancellation reason must not be empty".to_string(),
            ));
        }

        self.policy.ensure_can_cancel(&appointment, now)?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let mut updated = appointment;
        updated.status = AppointmentStatus::Cancelled;
        updated.cancellation = Some(CancellationRecord {
            reason: request.reason,
            actor: cancel_actor(&request.actor),
            cancelled_at: now,
        });
        updated.updated_at = now;

        let cancelled = self.store.update_appointment(updated).await?;
        info!("Cancelled appointment {}", cancelled.id);
        self.notify(NotificationKind::Cancelled, &cancelled).await;
        Ok(cancelled)
    }

    /// Moves the appointment to a new slot. Status survives the move; only
    /// the immediately preceding slot is kept in the reschedule audit.
    pub async fn reschedule(
        &self,
        id: &str,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();
        let appointment = self.get_appointment(id).await?;
        self.authorize_party(&appointment, &request.actor)?;
        self.policy.ensure_can_reschedule(&appointment, now)?;

        self.conflict
            .ensure_bookable(
                appointment.provider_id,
                request.new_date,
                request.new_time,
                Some(&appointment.id),
                now,
            )
            .await?;

        let moved = self
            .store
            .move_appointment(id, request.new_date, request.new_time, request.reason)
            .await?;

        info!(
            "Rescheduled appointment {} to {} {}",
            moved.id, moved.date, moved.time
        );
        self.notify(NotificationKind::Rescheduled, &moved).await;
        Ok(moved)
    }

    // ==========================================================================
    // RATING
    // ==========================================================================

    pub async fn rate(
        &self,
        id: &str,
        request: RateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.get_appointment(id).await?;

        let is_owner = request.actor.role == ActorRole::Requester
            && request.actor.id == appointment.requester_id;
        if !is_owner {
            return Err(SchedulingError::Authorization(
                "only the booking requester may rate the appointment".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Completed {
            return Err(SchedulingError::Conflict(
                "only completed appointments can be rated".to_string(),
            ));
        }
        if !(1..=5).contains(&request.score) {
            return Err(SchedulingError::Validation(
                "score must be between 1 and 5".to_string(),
            ));
        }

        let mut updated = appointment;
        updated.rating = Some(RatingRecord {
            score: request.score,
            review: request.review,
        });
        updated.updated_at = Utc::now();
        let rated = self.store.update_appointment(updated).await?;

        // Full recomputation, serialized by the store, so concurrent ratings
        // never leave a drifted average behind.
        let profile = self.store.recompute_provider_rating(rated.provider_id).await?;
        debug!(
            "Provider {} rating now {:.2} over {} reviews",
            profile.id, profile.rating_avg, profile.rating_count
        );
        Ok(rated)
    }

    // ==========================================================================
    // HELPERS
    // ==========================================================================

    /// Confirm/check-in/complete/no-show belong to the provider side.
    fn authorize_provider_side(
        &self,
        appointment: &Appointment,
        actor: &Actor,
    ) -> Result<(), SchedulingError> {
        if actor.is_admin() {
            return Ok(());
        }
        if actor.role == ActorRole::Provider && actor.id == appointment.provider_id {
            return Ok(());
        }
        Err(SchedulingError::Authorization(
            "only the appointment's provider may perform this transition".to_string(),
        ))
    }

    /// Cancel/reschedule are open to either party of the appointment.
    fn authorize_party(
        &self,
        appointment: &Appointment,
        actor: &Actor,
    ) -> Result<(), SchedulingError> {
        let allowed = match actor.role {
            ActorRole::Admin => true,
            ActorRole::Requester => actor.id == appointment.requester_id,
            ActorRole::Provider => actor.id == appointment.provider_id,
        };
        if allowed {
            Ok(())
        } else {
            Err(SchedulingError::Authorization(
                "actor is not a party to this appointment".to_string(),
            ))
        }
    }

    async fn notify(&self, kind: NotificationKind, appointment: &Appointment) {
        self.notifier
            .dispatch(NotificationEvent {
                kind,
                appointment_id: appointment.id.clone(),
                requester_id: appointment.requester_id,
                provider_id: appointment.provider_id,
            })
            .await;
    }
}

fn cancel_actor(actor: &Actor) -> CancelActor {
    match actor.role {
        ActorRole::Requester => CancelActor::Requester,
        ActorRole::Provider => CancelActor::Provider,
        ActorRole::Admin => CancelActor::Admin,
    }
}
