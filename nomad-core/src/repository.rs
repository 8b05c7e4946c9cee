use async_trait::async_trait;
use uuid::Uuid;

use crate::reservation::Reservation;
use crate::trip::Trip;

/// Failures from the durable store. Transient failures are retried once
/// by callers before being escalated; they are never reported as a
/// booking conflict.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation timed out: {0}")]
    Timeout(String),
}

/// Repository trait for trip records.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Upsert by trip id.
    async fn save_trip(&self, trip: &Trip) -> Result<(), StorageError>;

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StorageError>;

    async fn list_trips(&self, requester_id: &str) -> Result<Vec<Trip>, StorageError>;
}

/// Repository trait for the reservation log. Room availability state is
/// reconstructable from this log.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn save_reservation(&self, reservation: &Reservation) -> Result<(), StorageError>;

    /// Deleting an id that was already removed is a no-op.
    async fn delete_reservation(&self, id: Uuid) -> Result<(), StorageError>;

    async fn get_reservation(&self, id: Uuid) -> Result<Option<Reservation>, StorageError>;

    async fn list_for_trip(&self, trip_id: Uuid) -> Result<Vec<Reservation>, StorageError>;
}
