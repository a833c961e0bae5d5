use forgelink_core::{BuildPhase, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine protocol version {actual} does not support phased actions (requires {required})")]
    UnsupportedVersion { required: u32, actual: u32 },

    #[error("Unsupported configuration option: {0}")]
    UnsupportedOption(String),

    #[error("Invalid build argument: {0}")]
    InvalidBuildArgument(String),

    #[error("Action failed in phase {phase}: {message}")]
    ActionFailed { phase: BuildPhase, message: String },

    #[error("Build was cancelled")]
    Cancelled,

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    /// Create an action failure error for the given phase.
    pub fn action_failed(phase: BuildPhase, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            phase,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
