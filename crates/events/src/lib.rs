//! Event system for forgelink
//!
//! This crate provides the event bus and event types the engine uses to
//! report build lifecycle progress to observers.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
