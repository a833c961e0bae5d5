use serde::{Deserialize, Serialize};

/// Points in the build lifecycle at which a client-supplied action may run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// After the build model has been loaded, before projects are configured.
    AfterLoading,
    /// After projects are configured, before any task runs.
    AfterConfiguration,
    /// After the requested tasks have run.
    AfterBuild,
}

impl BuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterLoading => "after_loading",
            Self::AfterConfiguration => "after_configuration",
            Self::AfterBuild => "after_build",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "after_loading" => Some(Self::AfterLoading),
            "after_configuration" => Some(Self::AfterConfiguration),
            "after_build" => Some(Self::AfterBuild),
            _ => None,
        }
    }

    /// Position of this phase in the execution sequence, starting at zero.
    pub fn ordinal(&self) -> usize {
        match self {
            Self::AfterLoading => 0,
            Self::AfterConfiguration => 1,
            Self::AfterBuild => 2,
        }
    }

    /// All phases in execution order.
    pub fn all() -> [BuildPhase; 3] {
        [
            Self::AfterLoading,
            Self::AfterConfiguration,
            Self::AfterBuild,
        ]
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
