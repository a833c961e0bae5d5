//! Event types for the forgelink build lifecycle

use chrono::{DateTime, Utc};
use forgelink_core::BuildPhase;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: BuildEvent,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: BuildEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All build lifecycle events emitted by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    /// A build run started
    #[serde(rename = "build.started")]
    BuildStarted { build_id: Uuid },

    /// A phased action's phase began executing
    #[serde(rename = "phase.started")]
    PhaseStarted { build_id: Uuid, phase: BuildPhase },

    /// A phased action's phase finished
    #[serde(rename = "phase.finished")]
    PhaseFinished {
        build_id: Uuid,
        phase: BuildPhase,
        success: bool,
    },

    /// A task began executing
    #[serde(rename = "task.started")]
    TaskStarted { build_id: Uuid, path: String },

    /// A task finished
    #[serde(rename = "task.finished")]
    TaskFinished {
        build_id: Uuid,
        path: String,
        success: bool,
    },

    /// The build run finished
    #[serde(rename = "build.finished")]
    BuildFinished { build_id: Uuid, success: bool },

    /// The build run was cancelled before completing
    #[serde(rename = "build.cancelled")]
    BuildCancelled { build_id: Uuid },
}

impl BuildEvent {
    /// Get the build ID associated with this event
    pub fn build_id(&self) -> Uuid {
        match self {
            BuildEvent::BuildStarted { build_id }
            | BuildEvent::PhaseStarted { build_id, .. }
            | BuildEvent::PhaseFinished { build_id, .. }
            | BuildEvent::TaskStarted { build_id, .. }
            | BuildEvent::TaskFinished { build_id, .. }
            | BuildEvent::BuildFinished { build_id, .. }
            | BuildEvent::BuildCancelled { build_id } => *build_id,
        }
    }

    /// Get the phase associated with this event, if any
    pub fn phase(&self) -> Option<BuildPhase> {
        match self {
            BuildEvent::PhaseStarted { phase, .. } | BuildEvent::PhaseFinished { phase, .. } => {
                Some(*phase)
            }
            _ => None,
        }
    }
}
