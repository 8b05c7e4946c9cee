use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::StayInterval;
use crate::trip::TripKind;
use crate::{HotelId, RoomId};

/// Accepted on the wire; everything is normalized to `%Y-%m-%d` internally.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Trip payload as it arrives from the validation collaborator, field
/// names matching the public API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTripRequest {
    #[serde(rename = "type")]
    pub kind: TripKind,
    pub leaving_from: String,
    pub going_to: String,
    pub travel_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub hotel_id: Option<HotelId>,
    #[serde(default)]
    pub rooms: Vec<RoomId>,
}

/// Canonical trip request, produced by [`build`] and consumed by the
/// reservation coordinator. Dates are parsed, rooms deduplicated, and the
/// hotel stay window precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub requester_id: String,
    pub kind: TripKind,
    pub leaving_from: String,
    pub going_to: String,
    pub travel_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reason: String,
    pub hotel_id: Option<HotelId>,
    pub room_ids: Vec<RoomId>,
    stay: Option<StayInterval>,
}

impl TripRequest {
    /// The room occupancy window for this trip, present iff rooms were
    /// requested. Return trips occupy `[travel_date, return_date)`;
    /// one-way trips book a single night.
    pub fn stay_interval(&self) -> Option<StayInterval> {
        self.stay
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("validation failed: {}", describe(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Normalize a raw payload into a canonical [`TripRequest`].
///
/// Pure transformation, no side effects. All field errors are collected
/// so the caller can report every offending field at once.
pub fn build(raw: RawTripRequest, requester_id: &str) -> Result<TripRequest, ValidationError> {
    build_as_of(raw, requester_id, Utc::now().date_naive())
}

/// Same as [`build`] with an explicit "today" for the past-date check.
pub fn build_as_of(
    raw: RawTripRequest,
    requester_id: &str,
    today: NaiveDate,
) -> Result<TripRequest, ValidationError> {
    let mut errors = Vec::new();

    if raw.leaving_from.trim().is_empty() {
        errors.push(FieldError {
            field: "leavingFrom",
            message: "must not be empty".to_string(),
        });
    }
    if raw.going_to.trim().is_empty() {
        errors.push(FieldError {
            field: "goingTo",
            message: "must not be empty".to_string(),
        });
    }

    let travel_date = match parse_date(&raw.travel_date) {
        Some(date) => {
            if date < today {
                errors.push(FieldError {
                    field: "travelDate",
                    message: format!("{} is in the past", date),
                });
            }
            Some(date)
        }
        None => {
            errors.push(FieldError {
                field: "travelDate",
                message: format!("'{}' is not a calendar date", raw.travel_date),
            });
            None
        }
    };

    let return_date = match (raw.kind, raw.return_date.as_deref()) {
        (TripKind::Return, None) => {
            errors.push(FieldError {
                field: "returnDate",
                message: "required for a return trip".to_string(),
            });
            None
        }
        (TripKind::Return, Some(text)) => match parse_date(text) {
            Some(date) => {
                if let Some(travel) = travel_date {
                    if date <= travel {
                        errors.push(FieldError {
                            field: "returnDate",
                            message: format!("{} must be after travel date {}", date, travel),
                        });
                    }
                }
                Some(date)
            }
            None => {
                errors.push(FieldError {
                    field: "returnDate",
                    message: format!("'{}' is not a calendar date", text),
                });
                None
            }
        },
        // A return date on a one-way trip is ignored rather than rejected.
        (TripKind::OneWay, _) => None,
    };

    let room_ids = dedup_preserving_order(&raw.rooms);
    if !room_ids.is_empty() && raw.hotel_id.is_none() {
        errors.push(FieldError {
            field: "hotelId",
            message: "required when rooms are requested".to_string(),
        });
    }

    let stay = match (travel_date, room_ids.is_empty()) {
        (Some(travel), false) => match stay_window(raw.kind, travel, return_date) {
            Some(stay) => Some(stay),
            None => {
                // Only reachable while returnDate errors are already
                // recorded above, or at the end of the calendar.
                if errors.is_empty() {
                    errors.push(FieldError {
                        field: "travelDate",
                        message: "cannot derive a stay window".to_string(),
                    });
                }
                None
            }
        },
        _ => None,
    };

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    // travel_date is Some here: a parse failure pushed an error above.
    let Some(travel_date) = travel_date else {
        return Err(ValidationError { errors });
    };

    Ok(TripRequest {
        requester_id: requester_id.to_string(),
        kind: raw.kind,
        leaving_from: raw.leaving_from.trim().to_string(),
        going_to: raw.going_to.trim().to_string(),
        travel_date,
        return_date,
        reason: raw.reason.trim().to_string(),
        hotel_id: raw.hotel_id,
        room_ids,
        stay,
    })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

fn stay_window(
    kind: TripKind,
    travel_date: NaiveDate,
    return_date: Option<NaiveDate>,
) -> Option<StayInterval> {
    let check_out = match kind {
        TripKind::Return => return_date?,
        TripKind::OneWay => travel_date.succ_opt()?,
    };
    StayInterval::new(travel_date, check_out).ok()
}

fn dedup_preserving_order(rooms: &[RoomId]) -> Vec<RoomId> {
    let mut seen = std::collections::HashSet::new();
    rooms
        .iter()
        .copied()
        .filter(|room| seen.insert(*room))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn raw_return() -> RawTripRequest {
        RawTripRequest {
            kind: TripKind::Return,
            leaving_from: "Lagos".to_string(),
            going_to: "Nairobi".to_string(),
            travel_date: "2024-05-01".to_string(),
            return_date: Some("2024-05-05".to_string()),
            reason: "Client onboarding".to_string(),
            hotel_id: Some(12),
            rooms: vec![7, 3, 7],
        }
    }

    #[test]
    fn test_builds_canonical_return_trip() {
        let request = build_as_of(raw_return(), "emp-42", today()).unwrap();
        assert_eq!(request.requester_id, "emp-42");
        assert_eq!(request.room_ids, vec![7, 3]);
        let stay = request.stay_interval().unwrap();
        assert_eq!(stay.nights(), 4);
    }

    #[test]
    fn test_return_date_equal_to_travel_date_rejected() {
        let mut raw = raw_return();
        raw.return_date = Some("2024-05-01".to_string());
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "returnDate"));
    }

    #[test]
    fn test_missing_return_date_rejected() {
        let mut raw = raw_return();
        raw.return_date = None;
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "returnDate"));
    }

    #[test]
    fn test_rooms_without_hotel_rejected() {
        let mut raw = raw_return();
        raw.hotel_id = None;
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "hotelId"));
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let mut raw = raw_return();
        raw.travel_date = "next tuesday".to_string();
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "travelDate"));
    }

    #[test]
    fn test_past_travel_date_rejected() {
        let mut raw = raw_return();
        raw.travel_date = "2024-03-01".to_string();
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "travelDate"));
    }

    #[test]
    fn test_alternate_date_formats_normalized() {
        let mut raw = raw_return();
        raw.travel_date = "01-05-2024".to_string();
        raw.return_date = Some("2024/05/05".to_string());
        let request = build_as_of(raw, "emp-42", today()).unwrap();
        assert_eq!(request.travel_date.to_string(), "2024-05-01");
        assert_eq!(request.return_date.unwrap().to_string(), "2024-05-05");
    }

    #[test]
    fn test_one_way_books_single_night() {
        let raw = RawTripRequest {
            kind: TripKind::OneWay,
            leaving_from: "Lagos".to_string(),
            going_to: "Kampala".to_string(),
            travel_date: "2024-05-01".to_string(),
            return_date: None,
            reason: "Audit".to_string(),
            hotel_id: Some(4),
            rooms: vec![9],
        };
        let request = build_as_of(raw, "emp-9", today()).unwrap();
        let stay = request.stay_interval().unwrap();
        assert_eq!(stay.nights(), 1);
    }

    #[test]
    fn test_no_rooms_means_no_stay_window() {
        let mut raw = raw_return();
        raw.rooms = Vec::new();
        raw.hotel_id = None;
        let request = build_as_of(raw, "emp-42", today()).unwrap();
        assert!(request.stay_interval().is_none());
    }

    #[test]
    fn test_collects_multiple_field_errors() {
        let mut raw = raw_return();
        raw.travel_date = "garbage".to_string();
        raw.hotel_id = None;
        let err = build_as_of(raw, "emp-42", today()).unwrap_err();
        assert!(err.errors.len() >= 2);
    }
}
