pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod policy;
pub mod slots;
pub mod sweeper;
