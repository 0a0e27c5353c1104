//! Wire protocol

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
