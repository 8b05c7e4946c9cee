use std::sync::Arc;

use dashmap::DashMap;
use nomad_core::interval::StayInterval;
use nomad_core::RoomId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::calendar::{ReservedSlot, RoomCalendar};

/// Result of a read-only availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Conflicting(Uuid),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("interval conflicts with existing reservation {existing}")]
    Conflict { existing: Uuid },
}

/// Exclusive owner of every room's reserved-interval calendar.
///
/// Each room has its own `tokio` mutex; `reserve` performs its check and
/// insert under that lock, so two concurrent callers can never both see
/// "available" for conflicting intervals and both commit. Batch callers
/// can pin several rooms through [`AvailabilityIndex::lock`] (ascending
/// room-id order is the global lock order, see the coordinator) and use
/// the `*_locked` operations on the held guards.
pub struct AvailabilityIndex {
    rooms: DashMap<RoomId, Arc<Mutex<RoomCalendar>>>,
    /// reservation id -> room, maintained alongside calendar mutations so
    /// release does not need to scan every room.
    locations: DashMap<Uuid, RoomId>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            locations: DashMap::new(),
        }
    }

    fn room(&self, room_id: RoomId) -> Arc<Mutex<RoomCalendar>> {
        self.rooms
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(RoomCalendar::new())))
            .clone()
    }

    /// Acquire the room's calendar guard. A room never seen before gets
    /// an empty calendar (fully available).
    pub async fn lock(&self, room_id: RoomId) -> OwnedMutexGuard<RoomCalendar> {
        self.room(room_id).lock_owned().await
    }

    /// Read-only check of one room.
    pub async fn query(&self, room_id: RoomId, interval: &StayInterval) -> Availability {
        let calendar = self.lock(room_id).await;
        Self::query_locked(&calendar, interval)
    }

    pub fn query_locked(calendar: &RoomCalendar, interval: &StayInterval) -> Availability {
        match calendar.first_overlap(interval) {
            Some(slot) => Availability::Conflicting(slot.reservation_id),
            None => Availability::Available,
        }
    }

    /// Atomic check-and-insert for a single room.
    pub async fn reserve(
        &self,
        room_id: RoomId,
        interval: StayInterval,
        trip_id: Uuid,
    ) -> Result<Uuid, AvailabilityError> {
        let mut calendar = self.lock(room_id).await;
        self.reserve_locked(room_id, &mut calendar, interval, trip_id)
    }

    /// Check-and-insert against a guard the caller already holds.
    pub fn reserve_locked(
        &self,
        room_id: RoomId,
        calendar: &mut RoomCalendar,
        interval: StayInterval,
        trip_id: Uuid,
    ) -> Result<Uuid, AvailabilityError> {
        let reservation_id = Uuid::new_v4();
        calendar
            .insert(ReservedSlot {
                reservation_id,
                trip_id,
                interval,
            })
            .map_err(|existing| AvailabilityError::Conflict { existing })?;
        self.locations.insert(reservation_id, room_id);
        tracing::debug!(%reservation_id, room_id, "interval reserved");
        Ok(reservation_id)
    }

    /// Remove a reservation. Idempotent: an unknown or already-released
    /// id is a no-op.
    pub async fn release(&self, reservation_id: Uuid) {
        let Some((_, room_id)) = self.locations.remove(&reservation_id) else {
            return;
        };
        let mut calendar = self.lock(room_id).await;
        calendar.remove(reservation_id);
        tracing::debug!(%reservation_id, room_id, "reservation released");
    }

    /// Release against a guard the caller already holds.
    pub fn release_locked(&self, calendar: &mut RoomCalendar, reservation_id: Uuid) {
        self.locations.remove(&reservation_id);
        calendar.remove(reservation_id);
    }

    /// Whether the index currently holds this reservation.
    pub fn holds(&self, reservation_id: Uuid) -> bool {
        self.locations.contains_key(&reservation_id)
    }

    /// Reservation ids the index currently holds for a trip.
    pub async fn reservations_for_trip(&self, trip_id: Uuid) -> Vec<Uuid> {
        let handles: Vec<_> = self
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut found = Vec::new();
        for handle in handles {
            let calendar = handle.lock().await;
            found.extend(calendar.reservations_for_trip(trip_id));
        }
        found
    }
}

impl Default for AvailabilityIndex {
    fn default() -> Self {
        Self::new()
    }
}
