use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use nomad_api::{
    app,
    state::{AppState, AuthConfig},
};
use nomad_availability::AvailabilityIndex;
use nomad_store::app_config::BusinessRules;
use nomad_store::{InMemoryReservationRepository, InMemoryTripRepository};
use nomad_trips::{ReservationCoordinator, TripLifecycleManager};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_app() -> axum::Router {
    let index = Arc::new(AvailabilityIndex::new());
    let reservations = Arc::new(InMemoryReservationRepository::new());
    let trips = Arc::new(InMemoryTripRepository::new());
    let coordinator = ReservationCoordinator::new(index.clone(), reservations);
    let manager = Arc::new(TripLifecycleManager::new(trips, coordinator, index));

    app(AppState {
        trips: manager,
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
        business_rules: BusinessRules {
            max_rooms_per_trip: 10,
        },
    })
}

fn token(sub: &str, role: &str) -> String {
    let claims = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "role": role,
        "exp": (Utc::now().timestamp() + 3600) as usize,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn future_date(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

fn return_trip_payload(rooms: &[i64]) -> Value {
    json!({
        "type": "return",
        "leavingFrom": "Lagos",
        "goingTo": "Nairobi",
        "travelDate": future_date(30),
        "returnDate": future_date(34),
        "reason": "Regional planning summit",
        "hotelId": 12,
        "rooms": rooms,
    })
}

fn post(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_one_way_trip_returns_201() {
    let app = test_app();
    let payload = json!({
        "type": "one-way",
        "leavingFrom": "Lagos",
        "goingTo": "Accra",
        "travelDate": future_date(10),
        "reason": "Recruiting drive",
    });

    let response = app
        .oneshot(post("/v1/trips/oneway", &token("emp-1", "EMPLOYEE"), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["userId"], "emp-1");
}

#[tokio::test]
async fn test_return_trip_books_rooms() {
    let app = test_app();

    let response = app
        .oneshot(post(
            "/v1/trips/return",
            &token("emp-1", "EMPLOYEE"),
            &return_trip_payload(&[7, 3]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ROOMS_CONFIRMED");
    assert_eq!(body["reservations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_room_conflict_returns_409() {
    let app = test_app();
    let employee = token("emp-1", "EMPLOYEE");

    let first = app
        .clone()
        .oneshot(post("/v1/trips/return", &employee, &return_trip_payload(&[7])))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post("/v1/trips/return", &employee, &return_trip_payload(&[7])))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["rooms"], json!([7]));
}

#[tokio::test]
async fn test_missing_token_returns_401() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/trips/return")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(return_trip_payload(&[7]).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "missing bearer token");
}

#[tokio::test]
async fn test_return_date_before_travel_date_returns_400() {
    let app = test_app();
    let mut payload = return_trip_payload(&[7]);
    payload["returnDate"] = payload["travelDate"].clone();

    let response = app
        .oneshot(post(
            "/v1/trips/return",
            &token("emp-1", "EMPLOYEE"),
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"returnDate".to_string()));
}

#[tokio::test]
async fn test_manager_approves_booked_trip() {
    let app = test_app();
    let employee = token("emp-1", "EMPLOYEE");

    let created = app
        .clone()
        .oneshot(post("/v1/trips/return", &employee, &return_trip_payload(&[4])))
        .await
        .unwrap();
    let trip = body_json(created).await;
    let trip_id = trip["id"].as_str().unwrap().to_string();

    // Employees cannot approve.
    let forbidden = app
        .clone()
        .oneshot(post(
            &format!("/v1/trips/{trip_id}/approve"),
            &employee,
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let approved = app
        .oneshot(post(
            &format!("/v1/trips/{trip_id}/approve"),
            &token("mgr-1", "MANAGER"),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(approved.status(), StatusCode::OK);
    let body = body_json(approved).await;
    assert_eq!(body["status"], "APPROVED");
}

#[tokio::test]
async fn test_owner_reads_own_trip_others_forbidden() {
    let app = test_app();
    let owner = token("emp-1", "EMPLOYEE");

    let created = app
        .clone()
        .oneshot(post("/v1/trips/return", &owner, &return_trip_payload(&[9])))
        .await
        .unwrap();
    let trip = body_json(created).await;
    let trip_id = trip["id"].as_str().unwrap().to_string();

    let get = |token: String| {
        Request::builder()
            .method("GET")
            .uri(format!("/v1/trips/{trip_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let mine = app.clone().oneshot(get(owner)).await.unwrap();
    assert_eq!(mine.status(), StatusCode::OK);

    let other = app
        .oneshot(get(token("emp-2", "EMPLOYEE")))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::FORBIDDEN);
}
