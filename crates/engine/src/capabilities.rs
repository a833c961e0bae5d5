//! Engine capability advertisement.

/// Protocol version of this engine build.
pub const PROTOCOL_VERSION: u32 = 7;

/// Protocol version that introduced phased action execution.
pub const PHASED_ACTIONS_SINCE: u32 = 5;

/// What a connected engine supports.
///
/// The current engine always reports [`PROTOCOL_VERSION`]; older versions can
/// be impersonated through [`EngineCapabilities::with_protocol_version`],
/// which connection parameters use to exercise the version-mismatch paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCapabilities {
    protocol_version: u32,
    supported_options: Vec<String>,
}

impl EngineCapabilities {
    /// Capabilities of the engine shipped with this crate.
    pub fn current() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            supported_options: vec![
                "offline".to_string(),
                "parallel".to_string(),
                "info".to_string(),
                "stacktrace".to_string(),
            ],
        }
    }

    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_supported_option(mut self, option: impl Into<String>) -> Self {
        self.supported_options.push(option.into());
        self
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn supports_phased_actions(&self) -> bool {
        self.protocol_version >= PHASED_ACTIONS_SINCE
    }

    /// Whether a `--option` style argument is understood by this engine.
    pub fn supports_option(&self, option: &str) -> bool {
        self.supported_options.iter().any(|o| o == option)
    }
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self::current()
    }
}
