use nomad_core::trip::TripStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published on the lifecycle manager's broadcast channel whenever a
/// trip changes status. Delivery is best-effort; a send with no
/// subscriber is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripStatusChanged {
    pub trip_id: Uuid,
    pub requester_id: String,
    pub status: TripStatus,
    pub occurred_at: i64,
}
