//! The build engine: phase sequencing and task execution.
//!
//! One [`BuildEngine::execute`] call is one build. Phases run strictly in
//! order (after loading, after configuration, task execution, after build);
//! each phase's result is streamed to the caller as soon as the phase
//! completes, and a failure in any phase aborts everything that comes after
//! it without retracting results already delivered.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use forgelink_core::{BuildModel, BuildPhase, PhaseResult, SerializedPayload, TaskOutcome};
use forgelink_events::{BuildEvent, EventBus, EventEnvelope};

use crate::action::ActionContext;
use crate::cancel::CancellationToken;
use crate::capabilities::{EngineCapabilities, PHASED_ACTIONS_SINCE};
use crate::definition::BuildDefinition;
use crate::error::{EngineError, Result};
use crate::request::{PhaseActionSet, PhasedActionRequest};
use crate::scheduler;

/// Summary of a completed build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub build_id: Uuid,
    pub executed: Vec<TaskOutcome>,
}

/// In-process build engine.
pub struct BuildEngine {
    definition: BuildDefinition,
    capabilities: EngineCapabilities,
    bus: EventBus,
}

impl BuildEngine {
    pub fn new(definition: BuildDefinition) -> Self {
        Self {
            definition,
            capabilities: EngineCapabilities::current(),
            bus: EventBus::new(),
        }
    }

    /// Override the advertised capabilities (version-mismatch testing).
    pub fn with_capabilities(mut self, capabilities: EngineCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn capabilities(&self) -> &EngineCapabilities {
        &self.capabilities
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Execute one phased build.
    ///
    /// Phase results are pushed into `results` in phase order as each phase
    /// completes. Argument and capability problems are reported before any
    /// phase runs and produce no phase results at all.
    pub async fn execute(
        &self,
        request: PhasedActionRequest,
        cancellation: CancellationToken,
        results: mpsc::UnboundedSender<PhaseResult>,
    ) -> Result<BuildOutcome> {
        let build_id = request.build_id;
        info!(
            build_id = %build_id,
            tasks = ?request.tasks,
            arguments = ?request.arguments,
            "Executing phased build"
        );

        self.validate_arguments(&request.arguments)?;

        if !request.actions.is_empty() && !self.capabilities.supports_phased_actions() {
            warn!(
                build_id = %build_id,
                protocol_version = self.capabilities.protocol_version(),
                "Engine protocol too old for phased actions"
            );
            return Err(EngineError::UnsupportedVersion {
                required: PHASED_ACTIONS_SINCE,
                actual: self.capabilities.protocol_version(),
            });
        }

        self.emit(BuildEvent::BuildStarted { build_id });

        let result = self.run_build(&request, &cancellation, &results).await;

        match &result {
            Ok(outcome) => {
                info!(
                    build_id = %build_id,
                    executed = outcome.executed.len(),
                    "Build completed"
                );
                self.emit(BuildEvent::BuildFinished {
                    build_id,
                    success: true,
                });
            }
            Err(EngineError::Cancelled) => {
                info!(build_id = %build_id, "Build cancelled");
                self.emit(BuildEvent::BuildCancelled { build_id });
            }
            Err(error) => {
                warn!(build_id = %build_id, error = %error, "Build failed");
                self.emit(BuildEvent::BuildFinished {
                    build_id,
                    success: false,
                });
            }
        }

        result
    }

    async fn run_build(
        &self,
        request: &PhasedActionRequest,
        cancellation: &CancellationToken,
        results: &mpsc::UnboundedSender<PhaseResult>,
    ) -> Result<BuildOutcome> {
        let build_id = request.build_id;

        self.check_cancelled(cancellation)?;

        let mut model = self.definition.load();
        debug!(
            build_id = %build_id,
            task_count = model.all_tasks().len(),
            "Build model loaded"
        );
        self.run_phase(
            build_id,
            BuildPhase::AfterLoading,
            &request.actions,
            &mut model,
            None,
            results,
        )
        .await?;

        self.check_cancelled(cancellation)?;

        model.requested_tasks = request.tasks.clone();
        model.configured = true;
        self.run_phase(
            build_id,
            BuildPhase::AfterConfiguration,
            &request.actions,
            &mut model,
            None,
            results,
        )
        .await?;

        let plan = scheduler::plan_execution(&model, &model.requested_tasks)?;
        debug!(build_id = %build_id, plan = ?plan, "Task execution planned");

        let failing = self.definition.failing_tasks();
        let mut executed = Vec::new();
        for path in plan {
            self.check_cancelled(cancellation)?;
            self.emit(BuildEvent::TaskStarted {
                build_id,
                path: path.clone(),
            });

            let success = !failing.contains(&path);
            debug!(build_id = %build_id, task = %path, success, "Task executed");
            self.emit(BuildEvent::TaskFinished {
                build_id,
                path: path.clone(),
                success,
            });
            executed.push(TaskOutcome {
                path: path.clone(),
                success,
            });

            if !success {
                return Err(EngineError::BuildFailed(format!("Task {path} failed")));
            }
        }

        self.check_cancelled(cancellation)?;

        self.run_phase(
            build_id,
            BuildPhase::AfterBuild,
            &request.actions,
            &mut model,
            Some(&executed),
            results,
        )
        .await?;

        Ok(BuildOutcome { build_id, executed })
    }

    async fn run_phase(
        &self,
        build_id: Uuid,
        phase: BuildPhase,
        actions: &PhaseActionSet,
        model: &mut BuildModel,
        outcomes: Option<&[TaskOutcome]>,
        results: &mpsc::UnboundedSender<PhaseResult>,
    ) -> Result<()> {
        let Some(action) = actions.get(phase) else {
            return Ok(());
        };

        self.emit(BuildEvent::PhaseStarted { build_id, phase });
        info!(build_id = %build_id, phase = %phase, "Running phased action");

        let mut ctx = ActionContext::new(phase, model, outcomes);
        let run = action.execute(&mut ctx).await;

        match run {
            Ok(payload) => {
                let added = ctx.into_added_tasks();
                // Receiver gone just means nobody is listening for results.
                let _ = results.send(PhaseResult::success(phase, payload));
                self.emit(BuildEvent::PhaseFinished {
                    build_id,
                    phase,
                    success: true,
                });
                for task in added {
                    model.request_task(task);
                }
                Ok(())
            }
            Err(failure) => {
                let payload = SerializedPayload::from_value(&failure)?;
                let _ = results.send(PhaseResult::failure(phase, payload));
                self.emit(BuildEvent::PhaseFinished {
                    build_id,
                    phase,
                    success: false,
                });
                Err(EngineError::action_failed(phase, failure.message))
            }
        }
    }

    fn validate_arguments(&self, arguments: &[String]) -> Result<()> {
        for argument in arguments {
            let Some(option) = argument.strip_prefix("--") else {
                return Err(EngineError::InvalidBuildArgument(argument.clone()));
            };
            let name = option.split('=').next().unwrap_or(option);
            if name.is_empty() {
                return Err(EngineError::InvalidBuildArgument(argument.clone()));
            }
            if !self.capabilities.supports_option(name) {
                return Err(EngineError::UnsupportedOption(name.to_string()));
            }
        }
        Ok(())
    }

    fn check_cancelled(&self, cancellation: &CancellationToken) -> Result<()> {
        if cancellation.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    fn emit(&self, event: BuildEvent) {
        let _ = self.bus.publish(EventEnvelope::new(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionFailure, PhasedAction};
    use crate::cancel::CancellationSource;
    use crate::definition::{ProjectSpec, TaskSpec};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct ModelNameAction;

    #[async_trait]
    impl PhasedAction for ModelNameAction {
        async fn execute(
            &self,
            ctx: &mut ActionContext<'_>,
        ) -> std::result::Result<SerializedPayload, ActionFailure> {
            SerializedPayload::from_value(&ctx.model().root_project.name)
                .map_err(|e| ActionFailure::new(e.to_string()))
        }
    }

    struct FailingAction;

    #[async_trait]
    impl PhasedAction for FailingAction {
        async fn execute(
            &self,
            _ctx: &mut ActionContext<'_>,
        ) -> std::result::Result<SerializedPayload, ActionFailure> {
            Err(ActionFailure::new("boom"))
        }
    }

    struct RequestTasksAction {
        paths: Vec<String>,
    }

    #[async_trait]
    impl PhasedAction for RequestTasksAction {
        async fn execute(
            &self,
            ctx: &mut ActionContext<'_>,
        ) -> std::result::Result<SerializedPayload, ActionFailure> {
            for path in &self.paths {
                ctx.request_task(path.clone());
            }
            SerializedPayload::from_value(&()).map_err(|e| ActionFailure::new(e.to_string()))
        }
    }

    fn definition() -> BuildDefinition {
        BuildDefinition::new(
            ProjectSpec::new("demo", ":")
                .with_task(TaskSpec::new(":compile"))
                .with_task(TaskSpec::new(":test").depends_on(":compile"))
                .with_task(TaskSpec::new(":broken").failing()),
        )
    }

    fn channel() -> (
        mpsc::UnboundedSender<PhaseResult>,
        mpsc::UnboundedReceiver<PhaseResult>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn test_phases_deliver_results_in_order() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterLoading, Arc::new(ModelNameAction));
        actions.insert(BuildPhase::AfterConfiguration, Arc::new(ModelNameAction));
        actions.insert(BuildPhase::AfterBuild, Arc::new(ModelNameAction));

        let (tx, mut rx) = channel();
        let request = PhasedActionRequest::new(actions).with_tasks(vec![":test".to_string()]);
        let outcome = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap();

        let phases: Vec<BuildPhase> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|r| r.phase())
            .collect();
        assert_eq!(
            phases,
            vec![
                BuildPhase::AfterLoading,
                BuildPhase::AfterConfiguration,
                BuildPhase::AfterBuild,
            ]
        );
        assert_eq!(outcome.executed.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_action_aborts_later_phases() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterLoading, Arc::new(FailingAction));
        actions.insert(BuildPhase::AfterBuild, Arc::new(ModelNameAction));

        let (tx, mut rx) = channel();
        let request = PhasedActionRequest::new(actions).with_tasks(vec![":test".to_string()]);
        let error = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            EngineError::ActionFailed {
                phase: BuildPhase::AfterLoading,
                ..
            }
        ));

        let first = rx.try_recv().unwrap();
        assert!(!first.is_success());
        assert_eq!(first.phase(), BuildPhase::AfterLoading);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_produces_no_results() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterLoading, Arc::new(ModelNameAction));

        let source = CancellationSource::new();
        source.cancel();

        let (tx, mut rx) = channel();
        let request = PhasedActionRequest::new(actions);
        let error = engine.execute(request, source.token(), tx).await.unwrap_err();

        assert!(matches!(error, EngineError::Cancelled));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_task_failure_skips_after_build_phase() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterBuild, Arc::new(ModelNameAction));

        let (tx, mut rx) = channel();
        let request = PhasedActionRequest::new(actions).with_tasks(vec![":broken".to_string()]);
        let error = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap_err();

        assert!(matches!(error, EngineError::BuildFailed(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_configuration_action_extends_task_set() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(
            BuildPhase::AfterConfiguration,
            Arc::new(RequestTasksAction {
                paths: vec![":test".to_string()],
            }),
        );

        let (tx, _rx) = channel();
        let request = PhasedActionRequest::new(actions);
        let outcome = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap();

        let paths: Vec<&str> = outcome.executed.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec![":compile", ":test"]);
    }

    #[tokio::test]
    async fn test_no_tasks_requested_runs_nothing() {
        let engine = BuildEngine::new(definition());
        let (tx, _rx) = channel();
        let request = PhasedActionRequest::new(PhaseActionSet::new());
        let outcome = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap();
        assert!(outcome.executed.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_argument_rejected_before_phases() {
        let engine = BuildEngine::new(definition());
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterLoading, Arc::new(ModelNameAction));

        let (tx, mut rx) = channel();
        let request =
            PhasedActionRequest::new(actions).with_arguments(vec!["-x".to_string()]);
        let error = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap_err();

        assert!(matches!(error, EngineError::InvalidBuildArgument(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsupported_option_rejected() {
        let engine = BuildEngine::new(definition());
        let (tx, _rx) = channel();
        let request = PhasedActionRequest::new(PhaseActionSet::new())
            .with_arguments(vec!["--turbo".to_string()]);
        let error = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::UnsupportedOption(_)));
    }

    #[tokio::test]
    async fn test_old_engine_rejects_phased_actions() {
        let engine = BuildEngine::new(definition()).with_capabilities(
            EngineCapabilities::current().with_protocol_version(PHASED_ACTIONS_SINCE - 1),
        );
        let mut actions = PhaseActionSet::new();
        actions.insert(BuildPhase::AfterLoading, Arc::new(ModelNameAction));

        let (tx, _rx) = channel();
        let request = PhasedActionRequest::new(actions);
        let error = engine
            .execute(request, CancellationToken::never(), tx)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::UnsupportedVersion { .. }));
    }
}
