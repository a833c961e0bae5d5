use forgelink_core::{BuildPhase, CoreError};
use forgelink_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Target engine does not support phased actions (requires protocol {required}, engine has {actual})")]
    UnsupportedVersion { required: u32, actual: u32 },

    #[error("Configuration option not supported by the target engine: {option}")]
    UnsupportedConfiguration { option: String },

    #[error("Invalid build argument: {0}")]
    InvalidBuildArgument(String),

    #[error("Build action failed in phase {phase}: {message}")]
    ActionFailed { phase: BuildPhase, message: String },

    #[error("Build was cancelled before it completed")]
    Cancelled,

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Failure using the connection: {0}")]
    ConnectionFailed(String),

    #[error("Connection has been closed or is closing")]
    ConnectionClosed,

    #[error("An action is already registered for phase {phase}")]
    DuplicateAction { phase: BuildPhase },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<EngineError> for ClientError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::UnsupportedVersion { required, actual } => {
                Self::UnsupportedVersion { required, actual }
            }
            EngineError::UnsupportedOption(option) => Self::UnsupportedConfiguration { option },
            EngineError::InvalidBuildArgument(argument) => Self::InvalidBuildArgument(argument),
            EngineError::ActionFailed { phase, message } => Self::ActionFailed { phase, message },
            EngineError::Cancelled => Self::Cancelled,
            EngineError::BuildFailed(message) => Self::BuildFailed(message),
            EngineError::Core(core) => Self::Core(core),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let mapped: ClientError = EngineError::Cancelled.into();
        assert!(matches!(mapped, ClientError::Cancelled));

        let mapped: ClientError = EngineError::UnsupportedOption("turbo".to_string()).into();
        match mapped {
            ClientError::UnsupportedConfiguration { option } => assert_eq!(option, "turbo"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_error_display_names_phase() {
        let error = ClientError::DuplicateAction {
            phase: BuildPhase::AfterLoading,
        };
        assert!(error.to_string().contains("after_loading"));
    }
}
