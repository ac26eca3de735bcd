pub mod admin;
pub mod bookings;
pub mod devices;
pub mod events;
pub mod health;
