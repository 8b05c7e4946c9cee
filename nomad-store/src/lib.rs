pub mod app_config;
pub mod reservation_repo;
pub mod trip_repo;

pub use reservation_repo::InMemoryReservationRepository;
pub use trip_repo::InMemoryTripRepository;
