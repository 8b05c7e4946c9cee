use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use nomad_core::request::{self, FieldError, RawTripRequest, ValidationError};
use nomad_core::trip::{Trip, TripKind, TripStatus};
use nomad_core::HotelId;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{
    auth::ROLE_MANAGER, employee_auth_middleware, manager_auth_middleware, EmployeeClaims,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TripResponse {
    id: Uuid,
    user_id: String,
    status: TripStatus,
    #[serde(rename = "type")]
    kind: TripKind,
    leaving_from: String,
    going_to: String,
    travel_date: NaiveDate,
    return_date: Option<NaiveDate>,
    reason: String,
    hotel_id: Option<HotelId>,
    reservations: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            user_id: trip.requester_id,
            status: trip.status,
            kind: trip.kind,
            leaving_from: trip.leaving_from,
            going_to: trip.going_to,
            travel_date: trip.travel_date,
            return_date: trip.return_date,
            reason: trip.reason,
            hotel_id: trip.hotel_id,
            reservations: trip.reservation_ids,
            created_at: trip.created_at,
            updated_at: trip.updated_at,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let employee = Router::new()
        .route("/v1/trips/oneway", post(create_one_way_trip))
        .route("/v1/trips/return", post(create_return_trip))
        .route("/v1/trips", get(list_trips))
        .route("/v1/trips/{id}", get(get_trip))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            employee_auth_middleware,
        ));

    let manager = Router::new()
        .route("/v1/trips/{id}/approve", post(approve_trip))
        .route("/v1/trips/{id}/reject", post(reject_trip))
        .layer(axum::middleware::from_fn_with_state(
            state,
            manager_auth_middleware,
        ));

    employee.merge(manager)
}

async fn create_one_way_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<EmployeeClaims>,
    Json(raw): Json<RawTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>), AppError> {
    let response = submit_trip(&state, &claims, raw, TripKind::OneWay).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_return_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<EmployeeClaims>,
    Json(raw): Json<RawTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let response = submit_trip(&state, &claims, raw, TripKind::Return).await?;
    Ok(Json(response))
}

async fn submit_trip(
    state: &AppState,
    claims: &EmployeeClaims,
    raw: RawTripRequest,
    expected_kind: TripKind,
) -> Result<TripResponse, AppError> {
    if raw.kind != expected_kind {
        return Err(AppError::Validation(ValidationError {
            errors: vec![FieldError {
                field: "type",
                message: "trip type does not match this endpoint".to_string(),
            }],
        }));
    }

    let request = request::build(raw, &claims.sub)?;

    if request.room_ids.len() > state.business_rules.max_rooms_per_trip {
        return Err(AppError::Validation(ValidationError {
            errors: vec![FieldError {
                field: "rooms",
                message: format!(
                    "at most {} rooms per trip",
                    state.business_rules.max_rooms_per_trip
                ),
            }],
        }));
    }

    let submitted = state.trips.submit(request).await?;
    if submitted.trip.status == TripStatus::Conflict {
        return Err(AppError::RoomConflict {
            room_ids: submitted.conflicting_room_ids,
        });
    }

    info!(trip_id = %submitted.trip.id, status = %submitted.trip.status, "trip request processed");
    Ok(TripResponse::from(submitted.trip))
}

async fn get_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<EmployeeClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.trips.get(id).await?;
    if trip.requester_id != claims.sub && claims.role != ROLE_MANAGER {
        return Err(AppError::Authorization(
            "trip does not belong to you".to_string(),
        ));
    }
    Ok(Json(TripResponse::from(trip)))
}

async fn list_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<EmployeeClaims>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state.trips.list_for(&claims.sub).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

async fn approve_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.trips.approve(id).await?;
    Ok(Json(TripResponse::from(trip)))
}

async fn reject_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.trips.reject(id).await?;
    Ok(Json(TripResponse::from(trip)))
}
