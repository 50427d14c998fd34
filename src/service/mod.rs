pub mod chat_service;
pub mod engagement;
pub mod error;
pub mod projection;
pub mod review_service;
pub mod state_machine;
