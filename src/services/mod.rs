pub mod lifecycle;
pub mod notifications;
pub mod schedule;
