//! What the client hands the engine for one phased run.

use std::sync::Arc;

use forgelink_core::BuildPhase;
use uuid::Uuid;

use crate::action::PhasedAction;

/// At most one action per phase, already type-erased.
#[derive(Default)]
pub struct PhaseActionSet {
    after_loading: Option<Arc<dyn PhasedAction>>,
    after_configuration: Option<Arc<dyn PhasedAction>>,
    after_build: Option<Arc<dyn PhasedAction>>,
}

impl PhaseActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action for a phase. Returns `false` without replacing the
    /// existing action if the phase is already occupied.
    pub fn insert(&mut self, phase: BuildPhase, action: Arc<dyn PhasedAction>) -> bool {
        let slot = self.slot_mut(phase);
        if slot.is_some() {
            return false;
        }
        *slot = Some(action);
        true
    }

    pub fn get(&self, phase: BuildPhase) -> Option<&Arc<dyn PhasedAction>> {
        match phase {
            BuildPhase::AfterLoading => self.after_loading.as_ref(),
            BuildPhase::AfterConfiguration => self.after_configuration.as_ref(),
            BuildPhase::AfterBuild => self.after_build.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.after_loading.is_none()
            && self.after_configuration.is_none()
            && self.after_build.is_none()
    }

    fn slot_mut(&mut self, phase: BuildPhase) -> &mut Option<Arc<dyn PhasedAction>> {
        match phase {
            BuildPhase::AfterLoading => &mut self.after_loading,
            BuildPhase::AfterConfiguration => &mut self.after_configuration,
            BuildPhase::AfterBuild => &mut self.after_build,
        }
    }
}

impl std::fmt::Debug for PhaseActionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseActionSet")
            .field("after_loading", &self.after_loading.is_some())
            .field("after_configuration", &self.after_configuration.is_some())
            .field("after_build", &self.after_build.is_some())
            .finish()
    }
}

/// One phased run: actions, task selection and build arguments.
#[derive(Debug)]
pub struct PhasedActionRequest {
    pub build_id: Uuid,
    pub actions: PhaseActionSet,
    /// Task paths to run between the configuration and after-build phases.
    /// Empty means no tasks unless an action requests some.
    pub tasks: Vec<String>,
    /// `--` style build arguments, validated by the engine before any phase.
    pub arguments: Vec<String>,
}

impl PhasedActionRequest {
    pub fn new(actions: PhaseActionSet) -> Self {
        Self {
            build_id: Uuid::new_v4(),
            actions,
            tasks: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<String>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionContext, ActionFailure};
    use async_trait::async_trait;
    use forgelink_core::SerializedPayload;

    struct NoopAction;

    #[async_trait]
    impl PhasedAction for NoopAction {
        async fn execute(
            &self,
            _ctx: &mut ActionContext<'_>,
        ) -> std::result::Result<SerializedPayload, ActionFailure> {
            SerializedPayload::from_value(&()).map_err(|e| ActionFailure::new(e.to_string()))
        }
    }

    #[test]
    fn test_insert_rejects_occupied_phase() {
        let mut set = PhaseActionSet::new();
        assert!(set.insert(BuildPhase::AfterLoading, Arc::new(NoopAction)));
        assert!(!set.insert(BuildPhase::AfterLoading, Arc::new(NoopAction)));
        assert!(set.get(BuildPhase::AfterLoading).is_some());
        assert!(set.get(BuildPhase::AfterBuild).is_none());
    }

    #[test]
    fn test_empty_set() {
        let set = PhaseActionSet::new();
        assert!(set.is_empty());
    }
}
