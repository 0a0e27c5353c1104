//! Request and event handlers

pub mod api;
pub mod connection;
pub mod lobby;
pub mod signaling;

pub use connection::*;
pub use lobby::{handle_join_lobby, handle_leave_lobby};
pub use signaling::{handle_answer, handle_ice_candidate, handle_offer};
