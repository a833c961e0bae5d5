//! Core domain types for forgelink
//!
//! This crate holds the build model, the build phase enumeration and the
//! serializable phase result carrier shared by the engine and the client.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::CoreError;
