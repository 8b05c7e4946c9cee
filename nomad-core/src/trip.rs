use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::TripRequest;
use crate::HotelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripKind {
    #[serde(rename = "one-way")]
    OneWay,
    #[serde(rename = "return")]
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Pending,
    RoomsConfirmed,
    Conflict,
    Approved,
    Rejected,
}

impl TripStatus {
    /// Approved and Rejected accept no further transitions; Conflict is
    /// terminal for the attempt (a new submission makes a new trip).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TripStatus::Approved | TripStatus::Rejected | TripStatus::Conflict
        )
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TripStatus::Pending => "PENDING",
            TripStatus::RoomsConfirmed => "ROOMS_CONFIRMED",
            TripStatus::Conflict => "CONFLICT",
            TripStatus::Approved => "APPROVED",
            TripStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub requester_id: String,
    pub status: TripStatus,
    pub kind: TripKind,
    pub leaving_from: String,
    pub going_to: String,
    pub travel_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reason: String,
    pub hotel_id: Option<HotelId>,
    pub reservation_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Every trip starts Pending; the lifecycle manager owns all
    /// subsequent transitions.
    pub fn new(request: &TripRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id: request.requester_id.clone(),
            status: TripStatus::Pending,
            kind: request.kind,
            leaving_from: request.leaving_from.clone(),
            going_to: request.going_to.clone(),
            travel_date: request.travel_date,
            return_date: request.return_date,
            reason: request.reason.clone(),
            hotel_id: request.hotel_id,
            reservation_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, status: TripStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
