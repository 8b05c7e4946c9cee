pub mod interval;
pub mod repository;
pub mod request;
pub mod reservation;
pub mod trip;

pub use interval::StayInterval;
pub use request::{RawTripRequest, TripRequest, ValidationError};
pub use reservation::Reservation;
pub use trip::{Trip, TripKind, TripStatus};

/// Room identifiers come from the hotel inventory collaborator and are
/// plain integers on the wire.
pub type RoomId = i64;

/// Hotel identifiers, same origin as room ids.
pub type HotelId = i64;
