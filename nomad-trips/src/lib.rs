pub mod coordinator;
pub mod events;
pub mod lifecycle;

pub use coordinator::{BatchOutcome, CoordinatorError, ReservationCoordinator};
pub use events::TripStatusChanged;
pub use lifecycle::{SubmittedTrip, TripError, TripLifecycleManager};
