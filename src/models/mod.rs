pub mod booking;
pub mod event;

pub use booking::{
    validate_time_of_day, weekday_from_input, weekday_or_default, Booking, BookingStatus, Cadence,
    CustomerSnapshot, ProviderSnapshot, Schedule, ServiceKind,
};
pub use event::BookingEvent;
