pub mod chat;
pub mod dashboard;
pub mod requests;
pub mod reservations;
pub mod reviews;
