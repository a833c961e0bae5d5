//! Phased build action builder and executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use forgelink_core::BuildPhase;
use forgelink_engine::{
    BuildEngine, BuildOutcome, CancellationToken, PhaseActionSet, PhasedActionRequest,
};

use crate::action::{BuildAction, ErasedAction};
use crate::error::{ClientError, Result};
use crate::handler::{PhaseDispatcher, ResultHandler, TypedDispatcher};

/// Builder registering at most one action per build phase.
///
/// Registering a second action for an occupied phase is a usage error and is
/// reported immediately, leaving the first registration intact.
pub struct PhasedBuildActionBuilder {
    engine: Arc<BuildEngine>,
    closed: Arc<AtomicBool>,
    actions: PhaseActionSet,
    dispatchers: Vec<Box<dyn PhaseDispatcher>>,
}

impl PhasedBuildActionBuilder {
    pub(crate) fn new(engine: Arc<BuildEngine>, closed: Arc<AtomicBool>) -> Self {
        Self {
            engine,
            closed,
            actions: PhaseActionSet::new(),
            dispatchers: Vec::new(),
        }
    }

    /// Register an action to run once the build model is loaded, before any
    /// project is configured.
    ///
    /// Fails with [`ClientError::DuplicateAction`] if the phase is already
    /// occupied; the earlier registration is left untouched.
    pub fn add_after_loading_action<A, H>(&mut self, action: A, handler: H) -> Result<&mut Self>
    where
        A: BuildAction + 'static,
        H: ResultHandler<A::Output> + 'static,
    {
        self.add_action(BuildPhase::AfterLoading, action, handler)
    }

    /// Register an action to run after projects are configured and before any
    /// task runs. It may still extend the requested task set.
    pub fn add_after_configuration_action<A, H>(
        &mut self,
        action: A,
        handler: H,
    ) -> Result<&mut Self>
    where
        A: BuildAction + 'static,
        H: ResultHandler<A::Output> + 'static,
    {
        self.add_action(BuildPhase::AfterConfiguration, action, handler)
    }

    /// Register an action to run after the requested tasks have run.
    pub fn add_after_build_action<A, H>(&mut self, action: A, handler: H) -> Result<&mut Self>
    where
        A: BuildAction + 'static,
        H: ResultHandler<A::Output> + 'static,
    {
        self.add_action(BuildPhase::AfterBuild, action, handler)
    }

    fn add_action<A, H>(&mut self, phase: BuildPhase, action: A, handler: H) -> Result<&mut Self>
    where
        A: BuildAction + 'static,
        H: ResultHandler<A::Output> + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionClosed);
        }
        if !self
            .actions
            .insert(phase, Arc::new(ErasedAction::new(action)))
        {
            return Err(ClientError::DuplicateAction { phase });
        }
        self.dispatchers
            .push(Box::new(TypedDispatcher::new(phase, Box::new(handler))));
        debug!(phase = %phase, "Registered phased action");
        Ok(self)
    }

    /// Finalize the registrations into an executor.
    pub fn build(self) -> PhasedBuildActionExecutor {
        PhasedBuildActionExecutor {
            engine: self.engine,
            closed: self.closed,
            actions: self.actions,
            dispatchers: self.dispatchers,
            tasks: Vec::new(),
            arguments: Vec::new(),
            cancellation: CancellationToken::never(),
        }
    }
}

/// Executes the registered actions in their respective build phases.
///
/// One executor instance is used for a single run.
pub struct PhasedBuildActionExecutor {
    engine: Arc<BuildEngine>,
    closed: Arc<AtomicBool>,
    actions: PhaseActionSet,
    dispatchers: Vec<Box<dyn PhaseDispatcher>>,
    tasks: Vec<String>,
    arguments: Vec<String>,
    cancellation: CancellationToken,
}

impl PhasedBuildActionExecutor {
    /// Select the tasks to run between the configuration and after-build
    /// phases. Replaces any earlier selection; an empty selection runs no
    /// tasks unless an action requests some.
    pub fn for_tasks<I, S>(mut self, tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_open()?;
        self.tasks = tasks.into_iter().map(Into::into).collect();
        Ok(self)
    }

    /// Set `--` style build arguments; the engine validates them before any
    /// phase runs.
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_open()?;
        self.arguments = arguments.into_iter().map(Into::into).collect();
        Ok(self)
    }

    /// Attach a cancellation token observed before each phase and each task.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Result<Self> {
        self.ensure_open()?;
        self.cancellation = token;
        Ok(self)
    }

    /// Run all phases, blocking until the build finished or failed.
    ///
    /// Each phase's result is routed to its handler in phase order as that
    /// phase completes; this method returns only after every completed
    /// phase's handler has run.
    pub async fn run(self) -> Result<BuildOutcome> {
        self.ensure_open()?;

        let request = PhasedActionRequest::new(self.actions)
            .with_tasks(self.tasks)
            .with_arguments(self.arguments);
        info!(build_id = %request.build_id, "Starting phased build run");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = Arc::clone(&self.engine);
        let cancellation = self.cancellation.clone();
        let engine_task = tokio::spawn(async move { engine.execute(request, cancellation, tx).await });

        // The channel closes when the engine is done, so this drains every
        // phase result before the overall outcome is observed.
        while let Some(result) = rx.recv().await {
            if let Some(dispatcher) = self
                .dispatchers
                .iter()
                .find(|d| d.phase() == result.phase())
            {
                dispatcher.dispatch(&result);
            }
        }

        match engine_task.await {
            Ok(outcome) => outcome.map_err(ClientError::from),
            Err(join_error) => Err(ClientError::ConnectionFailed(join_error.to_string())),
        }
    }

    /// Start the run without waiting for it, delivering the overall outcome
    /// to `handler` once every phase handler has been invoked.
    pub fn run_with_handler<H>(self, handler: H) -> Result<JoinHandle<()>>
    where
        H: ResultHandler<BuildOutcome> + 'static,
    {
        self.ensure_open()?;
        Ok(tokio::spawn(async move {
            match self.run().await {
                Ok(outcome) => handler.on_complete(outcome),
                Err(error) => handler.on_failure(error),
            }
        }))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PhasedBuildActionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhasedBuildActionBuilder")
            .field("actions", &self.actions)
            .finish()
    }
}

impl std::fmt::Debug for PhasedBuildActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhasedBuildActionExecutor")
            .field("actions", &self.actions)
            .field("tasks", &self.tasks)
            .field("arguments", &self.arguments)
            .finish()
    }
}
