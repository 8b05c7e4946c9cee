use std::collections::HashMap;

use async_trait::async_trait;
use nomad_core::repository::{StorageError, TripRepository};
use nomad_core::trip::Trip;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Reference implementation of [`TripRepository`]. A SQL-backed store
/// plugs in behind the same trait; the engine only needs per-trip
/// read-modify-write.
pub struct InMemoryTripRepository {
    trips: RwLock<HashMap<Uuid, Trip>>,
}

impl InMemoryTripRepository {
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTripRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripRepository for InMemoryTripRepository {
    async fn save_trip(&self, trip: &Trip) -> Result<(), StorageError> {
        self.trips.write().await.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StorageError> {
        Ok(self.trips.read().await.get(&id).cloned())
    }

    async fn list_trips(&self, requester_id: &str) -> Result<Vec<Trip>, StorageError> {
        let mut trips: Vec<Trip> = self
            .trips
            .read()
            .await
            .values()
            .filter(|trip| trip.requester_id == requester_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }
}
