use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval::StayInterval;
use crate::RoomId;

/// A committed occupancy of one room for one trip. Created only by a
/// successful batch commit, immutable afterwards, removed only by an
/// explicit release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub room_id: RoomId,
    pub trip_id: Uuid,
    pub interval: StayInterval,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(id: Uuid, room_id: RoomId, trip_id: Uuid, interval: StayInterval) -> Self {
        Self {
            id,
            room_id,
            trip_id,
            interval,
            created_at: Utc::now(),
        }
    }
}
