// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest,
    RateAppointmentRequest, RescheduleAppointmentRequest, SlotQuery, TransitionRequest,
};
use crate::services::booking::BookingService;

pub async fn get_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let slots = service.get_slots(query.provider_id, query.date).await?;

    Ok(Json(json!({
        "provider_id": query.provider_id,
        "date": query.date,
        "slots": slots
    })))
}

pub async fn book_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.book(request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.get_appointment(&appointment_id).await?;

    Ok(Json(json!(appointment)))
}

pub async fn list_for_requester(
    State(state): State<AppState>,
    Path(requester_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service.list_for_requester(requester_id).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

pub async fn list_for_provider(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service.list_for_provider(provider_id).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

pub async fn confirm_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.confirm(&appointment_id, &request.actor).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn check_in_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.check_in(&appointment_id, &request.actor).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn complete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.complete(&appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn no_show_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.mark_no_show(&appointment_id, &request.actor).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.cancel(&appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.reschedule(&appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn rate_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.rate(&appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}
