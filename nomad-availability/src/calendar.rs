use nomad_core::interval::StayInterval;
use uuid::Uuid;

/// One committed occupancy on a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedSlot {
    pub reservation_id: Uuid,
    pub trip_id: Uuid,
    pub interval: StayInterval,
}

/// The reserved intervals of a single room, kept sorted by check-in and
/// pairwise disjoint. The index only mutates a calendar under the room's
/// lock, so insert is an atomic check-and-insert from the caller's view.
#[derive(Debug, Default)]
pub struct RoomCalendar {
    slots: Vec<ReservedSlot>,
}

impl RoomCalendar {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn slots(&self) -> &[ReservedSlot] {
        &self.slots
    }

    /// First reservation whose interval overlaps the requested one.
    pub fn first_overlap(&self, interval: &StayInterval) -> Option<&ReservedSlot> {
        self.slots
            .iter()
            .find(|slot| slot.interval.overlaps(interval))
    }

    /// Insert iff the interval is disjoint from every existing slot.
    /// On conflict returns the id of the existing reservation.
    pub fn insert(&mut self, slot: ReservedSlot) -> Result<(), Uuid> {
        if let Some(existing) = self.first_overlap(&slot.interval) {
            return Err(existing.reservation_id);
        }
        let position = self
            .slots
            .partition_point(|s| s.interval.check_in() < slot.interval.check_in());
        self.slots.insert(position, slot);
        Ok(())
    }

    /// Remove by reservation id; false if it was not present.
    pub fn remove(&mut self, reservation_id: Uuid) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.reservation_id != reservation_id);
        self.slots.len() != before
    }

    pub fn reservations_for_trip(&self, trip_id: Uuid) -> Vec<Uuid> {
        self.slots
            .iter()
            .filter(|slot| slot.trip_id == trip_id)
            .map(|slot| slot.reservation_id)
            .collect()
    }
}
