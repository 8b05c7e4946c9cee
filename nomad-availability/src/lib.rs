pub mod calendar;
pub mod index;

pub use calendar::{ReservedSlot, RoomCalendar};
pub use index::{Availability, AvailabilityError, AvailabilityIndex};
