use std::collections::HashMap;
use std::sync::Arc;

use nomad_availability::{Availability, AvailabilityIndex, RoomCalendar};
use nomad_core::repository::{ReservationRepository, StorageError};
use nomad_core::request::TripRequest;
use nomad_core::reservation::Reservation;
use nomad_core::RoomId;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Rollback must not leave orphaned reservations behind; deletes are
/// retried this many times before the failure is escalated to the log.
const ROLLBACK_ATTEMPTS: usize = 3;

/// Outcome of a batch commit. Conflict is a normal, reportable result,
/// not a failure of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Booked { reservation_ids: Vec<Uuid> },
    Conflict { conflicting_room_ids: Vec<RoomId> },
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The durable store failed after a retry. Distinct from a booking
    /// conflict; surfaced to callers as a server failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Index state disagreed with what this coordinator observed under
    /// the same locks. Fatal; logged and never silently ignored.
    #[error("availability index invariant violated: {0}")]
    Invariant(String),
}

/// Orchestrates the check-then-commit sequence for every room of a trip
/// against the availability index, with all-or-nothing semantics.
pub struct ReservationCoordinator {
    index: Arc<AvailabilityIndex>,
    reservations: Arc<dyn ReservationRepository>,
}

impl ReservationCoordinator {
    pub fn new(index: Arc<AvailabilityIndex>, reservations: Arc<dyn ReservationRepository>) -> Self {
        Self {
            index,
            reservations,
        }
    }

    /// Reserve every requested room for the trip, or none of them.
    ///
    /// Locks the batch's distinct rooms in ascending id order (the global
    /// lock order, so two trips naming the same rooms in different orders
    /// cannot deadlock), then checks and writes in original request order
    /// for deterministic conflict reporting.
    pub async fn commit_trip(
        &self,
        request: &TripRequest,
        trip_id: Uuid,
    ) -> Result<BatchOutcome, CoordinatorError> {
        let Some(stay) = request.stay_interval() else {
            return Ok(BatchOutcome::Booked {
                reservation_ids: Vec::new(),
            });
        };

        let mut lock_order = request.room_ids.clone();
        lock_order.sort_unstable();

        let mut guards: HashMap<RoomId, OwnedMutexGuard<RoomCalendar>> =
            HashMap::with_capacity(lock_order.len());
        for room_id in &lock_order {
            guards.insert(*room_id, self.index.lock(*room_id).await);
        }

        // With every room pinned, a read-only pass finds all conflicts
        // before anything is written.
        let mut conflicting = Vec::new();
        for room_id in &request.room_ids {
            let calendar = Self::calendar(&guards, *room_id)?;
            if let Availability::Conflicting(existing) =
                AvailabilityIndex::query_locked(calendar, &stay)
            {
                tracing::info!(room_id, %existing, %trip_id, "requested interval conflicts");
                conflicting.push(*room_id);
            }
        }
        if !conflicting.is_empty() {
            return Ok(BatchOutcome::Conflict {
                conflicting_room_ids: conflicting,
            });
        }

        let mut committed: Vec<(RoomId, Uuid)> = Vec::with_capacity(request.room_ids.len());
        for room_id in &request.room_ids {
            let calendar = guards.get_mut(room_id).ok_or_else(|| {
                CoordinatorError::Invariant(format!("room {room_id} was not locked for this batch"))
            })?;

            let reservation_id = match self.index.reserve_locked(*room_id, calendar, stay, trip_id)
            {
                Ok(id) => id,
                Err(err) => {
                    // The same guard reported Available moments ago.
                    self.rollback(&mut guards, &committed).await;
                    return Err(CoordinatorError::Invariant(format!(
                        "room {room_id} conflicted after its availability check: {err}"
                    )));
                }
            };
            committed.push((*room_id, reservation_id));

            let record = Reservation::new(reservation_id, *room_id, trip_id, stay);
            if let Err(err) = self.persist_with_retry(&record).await {
                tracing::error!(
                    %trip_id,
                    room_id,
                    error = %err,
                    "reservation persistence failed, rolling back batch"
                );
                self.rollback(&mut guards, &committed).await;
                return Err(CoordinatorError::Storage(err));
            }
        }

        let reservation_ids = committed.into_iter().map(|(_, id)| id).collect();
        tracing::info!(%trip_id, rooms = request.room_ids.len(), "batch booked");
        Ok(BatchOutcome::Booked { reservation_ids })
    }

    fn calendar<'a>(
        guards: &'a HashMap<RoomId, OwnedMutexGuard<RoomCalendar>>,
        room_id: RoomId,
    ) -> Result<&'a RoomCalendar, CoordinatorError> {
        guards.get(&room_id).map(|guard| &**guard).ok_or_else(|| {
            CoordinatorError::Invariant(format!("room {room_id} was not locked for this batch"))
        })
    }

    async fn persist_with_retry(&self, reservation: &Reservation) -> Result<(), StorageError> {
        match self.reservations.save_reservation(reservation).await {
            Ok(()) => Ok(()),
            Err(first) => {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    error = %first,
                    "reservation save failed, retrying once"
                );
                self.reservations.save_reservation(reservation).await
            }
        }
    }

    /// Undo every reservation of a failed batch. Index slots are removed
    /// under the guards still held by the caller; persisted rows are
    /// deleted with retries (deleting a row that was never written is a
    /// no-op per the repository contract).
    async fn rollback(
        &self,
        guards: &mut HashMap<RoomId, OwnedMutexGuard<RoomCalendar>>,
        committed: &[(RoomId, Uuid)],
    ) {
        for (room_id, reservation_id) in committed {
            if let Some(calendar) = guards.get_mut(room_id) {
                self.index.release_locked(calendar, *reservation_id);
            }
            let mut attempt = 0;
            loop {
                match self.reservations.delete_reservation(*reservation_id).await {
                    Ok(()) => break,
                    Err(err) if attempt + 1 < ROLLBACK_ATTEMPTS => {
                        attempt += 1;
                        tracing::warn!(
                            %reservation_id,
                            error = %err,
                            attempt,
                            "retrying rollback delete"
                        );
                    }
                    Err(err) => {
                        tracing::error!(
                            %reservation_id,
                            error = %err,
                            "rollback could not delete reservation record, escalating"
                        );
                        break;
                    }
                }
            }
        }
    }
}
