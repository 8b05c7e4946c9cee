use std::collections::HashMap;

use async_trait::async_trait;
use nomad_core::repository::{ReservationRepository, StorageError};
use nomad_core::reservation::Reservation;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Reference implementation of [`ReservationRepository`]; the durable
/// reservation log the availability index can be rebuilt from.
pub struct InMemoryReservationRepository {
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn save_reservation(&self, reservation: &Reservation) -> Result<(), StorageError> {
        self.reservations
            .write()
            .await
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn delete_reservation(&self, id: Uuid) -> Result<(), StorageError> {
        // Absent id: already released, nothing to do.
        self.reservations.write().await.remove(&id);
        Ok(())
    }

    async fn get_reservation(&self, id: Uuid) -> Result<Option<Reservation>, StorageError> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn list_for_trip(&self, trip_id: Uuid) -> Result<Vec<Reservation>, StorageError> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|reservation| reservation.trip_id == trip_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nomad_core::StayInterval;

    fn reservation(trip_id: Uuid) -> Reservation {
        let check_in = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        Reservation::new(
            Uuid::new_v4(),
            7,
            trip_id,
            StayInterval::new(check_in, check_out).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_save_and_list_by_trip() {
        let repo = InMemoryReservationRepository::new();
        let trip_id = Uuid::new_v4();
        repo.save_reservation(&reservation(trip_id)).await.unwrap();
        repo.save_reservation(&reservation(trip_id)).await.unwrap();
        repo.save_reservation(&reservation(Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(repo.list_for_trip(trip_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let repo = InMemoryReservationRepository::new();
        repo.delete_reservation(Uuid::new_v4()).await.unwrap();
    }
}
