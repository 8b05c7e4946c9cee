use std::sync::Arc;

use chrono::Utc;
use nomad_availability::AvailabilityIndex;
use nomad_core::repository::{StorageError, TripRepository};
use nomad_core::request::TripRequest;
use nomad_core::trip::{Trip, TripStatus};
use nomad_core::RoomId;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::coordinator::{BatchOutcome, CoordinatorError, ReservationCoordinator};
use crate::events::TripStatusChanged;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("trip not found: {0}")]
    NotFound(Uuid),

    #[error("invalid trip transition from {from} to {to}")]
    InvalidTransition { from: TripStatus, to: TripStatus },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error("trip {trip_id} references reservation {reservation_id} missing from the index")]
    InvariantViolation {
        trip_id: Uuid,
        reservation_id: Uuid,
    },
}

/// Result of submitting a trip request. The trip's status carries the
/// outcome; conflicting room ids are reported alongside so the caller
/// can retry with different rooms or dates.
#[derive(Debug, Clone)]
pub struct SubmittedTrip {
    pub trip: Trip,
    pub conflicting_room_ids: Vec<RoomId>,
}

/// Owns the trip state machine and persists every outcome.
///
/// Pending → RoomsConfirmed | Conflict (via the coordinator), then
/// Pending/RoomsConfirmed → Approved | Rejected by a separate approval
/// action. Approval policy itself lives outside this engine.
pub struct TripLifecycleManager {
    trips: Arc<dyn TripRepository>,
    coordinator: ReservationCoordinator,
    index: Arc<AvailabilityIndex>,
    events: broadcast::Sender<TripStatusChanged>,
    /// Serializes terminal transitions so the status read and the
    /// subsequent save act on the same trip state.
    transitions: Mutex<()>,
}

impl TripLifecycleManager {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        coordinator: ReservationCoordinator,
        index: Arc<AvailabilityIndex>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            trips,
            coordinator,
            index,
            events,
            transitions: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TripStatusChanged> {
        self.events.subscribe()
    }

    /// Accept a canonical request for processing: persist the Pending
    /// trip, run the room batch if rooms were requested, and record the
    /// outcome. Trips without rooms stay Pending awaiting approval.
    pub async fn submit(&self, request: TripRequest) -> Result<SubmittedTrip, TripError> {
        let mut trip = Trip::new(&request);
        self.save_with_retry(&trip).await?;
        tracing::info!(trip_id = %trip.id, requester = %trip.requester_id, "trip accepted");

        if request.room_ids.is_empty() {
            return Ok(SubmittedTrip {
                trip,
                conflicting_room_ids: Vec::new(),
            });
        }

        match self.coordinator.commit_trip(&request, trip.id).await? {
            BatchOutcome::Booked { reservation_ids } => {
                trip.reservation_ids = reservation_ids;
                self.verify_reservations(&trip)?;
                trip.update_status(TripStatus::RoomsConfirmed);
                self.save_with_retry(&trip).await?;
                self.publish(&trip);
                Ok(SubmittedTrip {
                    trip,
                    conflicting_room_ids: Vec::new(),
                })
            }
            BatchOutcome::Conflict {
                conflicting_room_ids,
            } => {
                trip.update_status(TripStatus::Conflict);
                self.save_with_retry(&trip).await?;
                self.publish(&trip);
                Ok(SubmittedTrip {
                    trip,
                    conflicting_room_ids,
                })
            }
        }
    }

    /// Approval hook: Pending | RoomsConfirmed → Approved.
    pub async fn approve(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        self.transition_terminal(trip_id, TripStatus::Approved).await
    }

    /// Approval hook: Pending | RoomsConfirmed → Rejected.
    pub async fn reject(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        self.transition_terminal(trip_id, TripStatus::Rejected).await
    }

    pub async fn get(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        self.trips
            .get_trip(trip_id)
            .await?
            .ok_or(TripError::NotFound(trip_id))
    }

    pub async fn list_for(&self, requester_id: &str) -> Result<Vec<Trip>, TripError> {
        Ok(self.trips.list_trips(requester_id).await?)
    }

    async fn transition_terminal(
        &self,
        trip_id: Uuid,
        to: TripStatus,
    ) -> Result<Trip, TripError> {
        // Hold across read, guard, and save: without this, two racing
        // approvals could both pass the guard and the later write would
        // overwrite the earlier terminal status.
        let _guard = self.transitions.lock().await;

        let mut trip = self.get(trip_id).await?;
        if !matches!(trip.status, TripStatus::Pending | TripStatus::RoomsConfirmed) {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                to,
            });
        }
        trip.update_status(to);
        self.save_with_retry(&trip).await?;
        self.publish(&trip);
        tracing::info!(%trip_id, status = %trip.status, "trip transitioned");
        Ok(trip)
    }

    /// Every reservation attached to a trip must currently exist in the
    /// index. A mismatch is fatal, never silently ignored.
    fn verify_reservations(&self, trip: &Trip) -> Result<(), TripError> {
        for reservation_id in &trip.reservation_ids {
            if !self.index.holds(*reservation_id) {
                tracing::error!(
                    trip_id = %trip.id,
                    %reservation_id,
                    "trip references a reservation the index does not hold"
                );
                return Err(TripError::InvariantViolation {
                    trip_id: trip.id,
                    reservation_id: *reservation_id,
                });
            }
        }
        Ok(())
    }

    async fn save_with_retry(&self, trip: &Trip) -> Result<(), StorageError> {
        match self.trips.save_trip(trip).await {
            Ok(()) => Ok(()),
            Err(first) => {
                tracing::warn!(trip_id = %trip.id, error = %first, "trip save failed, retrying once");
                self.trips.save_trip(trip).await
            }
        }
    }

    fn publish(&self, trip: &Trip) {
        let _ = self.events.send(TripStatusChanged {
            trip_id: trip.id,
            requester_id: trip.requester_id.clone(),
            status: trip.status,
            occurred_at: Utc::now().timestamp(),
        });
    }
}
