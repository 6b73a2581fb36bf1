pub mod checkin;
pub mod system;
