mod model;
mod payload;
mod phase;

pub use model::{BuildModel, ProjectModel, TaskNode, TaskOutcome};
pub use payload::{PhaseResult, SerializedPayload};
pub use phase::BuildPhase;
