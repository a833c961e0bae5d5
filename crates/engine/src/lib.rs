//! In-process build engine for forgelink
//!
//! The engine loads a build model from a [`BuildDefinition`], sequences the
//! three phased-action points (after loading, after configuration, after
//! build), runs the requested tasks in dependency order between the last two
//! phases, and streams each phase's [`forgelink_core::PhaseResult`] back to
//! the client as soon as the phase completes.

pub mod action;
pub mod cancel;
pub mod capabilities;
pub mod definition;
pub mod error;
pub mod request;
pub mod runner;
pub mod scheduler;

pub use action::{ActionContext, ActionFailure, PhasedAction};
pub use cancel::{CancellationSource, CancellationToken};
pub use capabilities::{EngineCapabilities, PHASED_ACTIONS_SINCE, PROTOCOL_VERSION};
pub use definition::{BuildDefinition, ProjectSpec, TaskSpec};
pub use error::{EngineError, Result};
pub use request::{PhaseActionSet, PhasedActionRequest};
pub use runner::{BuildEngine, BuildOutcome};
