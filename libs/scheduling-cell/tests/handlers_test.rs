use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use provider_cell::router::{provider_routes, requester_routes};
use scheduling_cell::router::appointment_routes;
use shared_config::AppConfig;
use shared_store::AppState;

fn create_test_app() -> Router {
    let state = AppState::in_memory(AppConfig::default());
    Router::new()
        .nest("/providers", provider_routes(state.clone()))
        .nest("/requesters", requester_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}

async fn request_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Registers a provider with Monday 09:00-12:00 availability plus a
/// requester, returning both ids.
async fn seed_parties(app: &Router) -> (Uuid, Uuid) {
    let (status, body) =
        request_json(app, "POST", "/providers", json!({ "display_name": "Dr. Vega" })).await;
    assert_eq!(status, StatusCode::OK);
    let provider_id: Uuid = body["provider"]["id"].as_str().unwrap().parse().unwrap();

    let (status, body) =
        request_json(app, "POST", "/requesters", json!({ "display_name": "Sam Ortiz" })).await;
    assert_eq!(status, StatusCode::OK);
    let requester_id: Uuid = body["requester"]["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = request_json(
        app,
        "PUT",
        &format!("/providers/{}/availability", provider_id),
        json!({
            "days": [{
                "weekday": "Mon",
                "is_available": true,
                "windows": [{ "start": "09:00", "end": "12:00" }]
            }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (provider_id, requester_id)
}

fn booking_body(requester_id: Uuid, provider_id: Uuid, time: &str) -> Value {
    json!({
        "requester_id": requester_id,
        "provider_id": provider_id,
        "date": "2099-01-05",
        "time": time,
        "appointment_type": "general_consultation",
        "reason": "persistent headaches",
        "symptoms": ["headache"]
    })
}

#[tokio::test]
async fn booking_round_trip_over_http() {
    let app = create_test_app();
    let (provider_id, requester_id) = seed_parties(&app).await;

    let (status, body) = get_json(
        &app,
        &format!("/appointments/slots?provider_id={}&date=2099-01-05", provider_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 6);

    let (status, body) = request_json(
        &app,
        "POST",
        "/appointments",
        booking_body(requester_id, provider_id, "10:00"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let appointment_id = body["appointment"]["id"].as_str().unwrap().to_string();
    assert!(appointment_id.starts_with("APT20990105"));
    assert_eq!(body["appointment"]["status"], json!("scheduled"));
    assert_eq!(body["appointment"]["time"], json!("10:00"));

    let (status, body) = get_json(&app, &format!("/appointments/{}", appointment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(appointment_id));

    let (status, body) = get_json(
        &app,
        &format!("/appointments/slots?provider_id={}&date=2099-01-05", provider_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ten = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == json!("10:00"))
        .unwrap();
    assert_eq!(ten["available"], json!(false));
}

#[tokio::test]
async fn double_booking_returns_409() {
    let app = create_test_app();
    let (provider_id, requester_id) = seed_parties(&app).await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/appointments",
        booking_body(requester_id, provider_id, "09:30"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        &app,
        "POST",
        "/appointments",
        booking_body(requester_id, provider_id, "09:30"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn empty_reason_returns_400() {
    let app = create_test_app();
    let (provider_id, requester_id) = seed_parties(&app).await;

    let mut body = booking_body(requester_id, provider_id, "09:00");
    body["reason"] = json!("  ");
    let (status, _) = request_json(&app, "POST", "/appointments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_appointment_returns_404() {
    let app = create_test_app();
    let (status, _) = get_json(&app, "/appointments/APT20990105face").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lifecycle_transitions_over_http() {
    let app = create_test_app();
    let (provider_id, requester_id) = seed_parties(&app).await;

    let (_, body) = request_json(
        &app,
        "POST",
        "/appointments",
        booking_body(requester_id, provider_id, "11:00"),
    )
    .await;
    let appointment_id = body["appointment"]["id"].as_str().unwrap().to_string();

    let provider_actor = json!({ "actor": { "id": provider_id, "role": "provider" } });

    // The requester is not allowed to confirm.
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/confirm", appointment_id),
        json!({ "actor": { "id": requester_id, "role": "requester" } }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/confirm", appointment_id),
        provider_actor.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], json!("confirmed"));

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/check-in", appointment_id),
        provider_actor.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], json!("in_progress"));

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/complete", appointment_id),
        json!({
            "actor": { "id": provider_id, "role": "provider" },
            "notes": "advised rest"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], json!("completed"));
    assert_eq!(body["appointment"]["provider_notes"], json!("advised rest"));

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/rating", appointment_id),
        json!({
            "actor": { "id": requester_id, "role": "requester" },
            "score": 5,
            "review": "great"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["rating"]["score"], json!(5));

    let (status, body) = get_json(&app, &format!("/providers/{}", provider_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating_count"], json!(1));
}

#[tokio::test]
async fn reschedule_and_cancel_over_http() {
    let app = create_test_app();
    let (provider_id, requester_id) = seed_parties(&app).await;

    let (_, body) = request_json(
        &app,
        "POST",
        "/appointments",
        booking_body(requester_id, provider_id, "09:00"),
    )
    .await;
    let appointment_id = body["appointment"]["id"].as_str().unwrap().to_string();

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/reschedule", appointment_id),
        json!({
            "actor": { "id": requester_id, "role": "requester" },
            "new_date": "2099-01-05",
            "new_time": "10:30",
            "reason": "conflict at work"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["time"], json!("10:30"));
    assert_eq!(body["appointment"]["reschedule"]["previous_time"], json!("09:00"));

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/appointments/{}/cancel", appointment_id),
        json!({
            "actor": { "id": requester_id, "role": "requester" },
            "reason": "feeling better"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], json!("cancelled"));
    assert_eq!(
        body["appointment"]["cancellation"]["actor"],
        json!("requester")
    );
}
