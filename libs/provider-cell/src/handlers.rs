// libs/provider-cell/src/handlers.rs
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    CreateBlockedRangeRequest, RegisterProviderRequest, RegisterRequesterRequest,
    UpdateBlockedRangeRequest, UpsertAvailabilityRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::directory::DirectoryService;

pub async fn register_provider(
    State(state): State<AppState>,
    Json(request): Json<RegisterProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let profile = service.register_provider(request).await?;

    Ok(Json(json!({
        "success": true,
        "provider": profile
    })))
}

pub async fn register_requester(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequesterRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let profile = service.register_requester(request).await?;

    Ok(Json(json!({
        "success": true,
        "requester": profile
    })))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let profile = service.get_provider(provider_id).await?;

    Ok(Json(json!(profile)))
}

pub async fn put_availability(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<UpsertAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let availability = service.set_weekly_availability(provider_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "availability": availability
    })))
}

pub async fn get_availability(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let availability = service.get_weekly_availability(provider_id).await?;

    Ok(Json(json!(availability)))
}

pub async fn create_blocked_range(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<CreateBlockedRangeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let range = service.create_blocked_range(provider_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "blocked_range": range
    })))
}

pub async fn list_blocked_ranges(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let ranges = service.list_blocked_ranges(provider_id).await?;

    Ok(Json(json!({ "blocked_ranges": ranges })))
}

pub async fn update_blocked_range(
    State(state): State<AppState>,
    Path(range_id): Path<Uuid>,
    Json(request): Json<UpdateBlockedRangeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let range = service.update_blocked_range(range_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "blocked_range": range
    })))
}
