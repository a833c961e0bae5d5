//! Action execution seam between the client and the engine.
//!
//! Client actions are typed; by the time they reach the engine they have been
//! erased to [`PhasedAction`], which produces an opaque serialized payload.
//! The client side decides how to interpret it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use forgelink_core::{BuildModel, BuildPhase, SerializedPayload, TaskOutcome};

/// Failure raised by a phased action.
///
/// Serializable so it can travel inside the failure payload of a
/// [`forgelink_core::PhaseResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionFailure {
    pub message: String,
}

impl ActionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// What an action sees while it runs.
pub struct ActionContext<'a> {
    phase: BuildPhase,
    model: &'a BuildModel,
    outcomes: Option<&'a [TaskOutcome]>,
    added_tasks: Vec<String>,
}

impl<'a> ActionContext<'a> {
    /// Build a context directly; useful for exercising actions in isolation.
    pub fn new(
        phase: BuildPhase,
        model: &'a BuildModel,
        outcomes: Option<&'a [TaskOutcome]>,
    ) -> Self {
        Self {
            phase,
            model,
            outcomes,
            added_tasks: Vec::new(),
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn model(&self) -> &BuildModel {
        self.model
    }

    /// Task outcomes, populated for the after-build phase only.
    pub fn task_outcomes(&self) -> &[TaskOutcome] {
        self.outcomes.unwrap_or(&[])
    }

    /// Add a task to the set executed after the configuration phase.
    ///
    /// Only effective during the after-configuration phase: the task graph is
    /// not built yet before configuration and already ran afterwards.
    pub fn request_task(&mut self, path: impl Into<String>) {
        let path = path.into();
        if self.phase != BuildPhase::AfterConfiguration {
            warn!(
                phase = %self.phase,
                task = %path,
                "Ignoring task request outside the after-configuration phase"
            );
            return;
        }
        if !self.added_tasks.contains(&path) {
            self.added_tasks.push(path);
        }
    }

    pub(crate) fn into_added_tasks(self) -> Vec<String> {
        self.added_tasks
    }
}

/// Type-erased phased action as the engine executes it.
#[async_trait]
pub trait PhasedAction: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<SerializedPayload, ActionFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgelink_core::{ProjectModel, TaskNode};

    fn model() -> BuildModel {
        BuildModel::new(ProjectModel::new("root", ":").with_task(TaskNode::new(":check")))
    }

    #[test]
    fn test_request_task_only_during_configuration() {
        let model = model();

        let mut ctx = ActionContext::new(BuildPhase::AfterLoading, &model, None);
        ctx.request_task(":check");
        assert!(ctx.into_added_tasks().is_empty());

        let mut ctx = ActionContext::new(BuildPhase::AfterConfiguration, &model, None);
        ctx.request_task(":check");
        ctx.request_task(":check");
        assert_eq!(ctx.into_added_tasks(), vec![":check".to_string()]);
    }

    #[test]
    fn test_outcomes_default_empty() {
        let model = model();
        let ctx = ActionContext::new(BuildPhase::AfterLoading, &model, None);
        assert!(ctx.task_outcomes().is_empty());
    }
}
