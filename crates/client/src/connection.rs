//! Connection to a build engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use forgelink_engine::{BuildDefinition, BuildEngine, EngineCapabilities};
use forgelink_events::{EventBus, EventEnvelope};

use crate::executor::PhasedBuildActionBuilder;

/// How to connect to an engine.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    definition: BuildDefinition,
    capabilities: Option<EngineCapabilities>,
}

impl ConnectionParams {
    /// Connect to an in-process engine for the given build.
    pub fn for_definition(definition: BuildDefinition) -> Self {
        Self {
            definition,
            capabilities: None,
        }
    }

    /// Override the engine's advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: EngineCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

/// A connection to a build engine; executors are created from and owned by it.
///
/// Closing the connection flips a flag every executor created from it
/// observes: any mutating or run call made afterwards fails with
/// [`crate::ClientError::ConnectionClosed`].
pub struct BuildConnection {
    engine: Arc<BuildEngine>,
    bus: EventBus,
    closed: Arc<AtomicBool>,
}

impl BuildConnection {
    pub fn connect(params: ConnectionParams) -> Self {
        let bus = EventBus::new();
        let mut engine = BuildEngine::new(params.definition).with_event_bus(bus.clone());
        if let Some(capabilities) = params.capabilities {
            engine = engine.with_capabilities(capabilities);
        }
        info!(
            protocol_version = engine.capabilities().protocol_version(),
            "Connected to build engine"
        );
        Self {
            engine: Arc::new(engine),
            bus,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start describing a phased action run.
    pub fn phased_action(&self) -> PhasedBuildActionBuilder {
        PhasedBuildActionBuilder::new(Arc::clone(&self.engine), Arc::clone(&self.closed))
    }

    /// Subscribe to build lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    /// Close the connection. Executors created from it become unusable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        info!("Build engine connection closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for BuildConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildConnection")
            .field("closed", &self.is_closed())
            .finish()
    }
}
