//! Client-facing tooling API for forgelink
//!
//! Connect to a build engine, register at most one [`BuildAction`] per build
//! phase (each paired with a [`ResultHandler`]), select the tasks to run, and
//! execute the whole thing either awaiting completion or fire-and-forget with
//! an overall completion handler.
//!
//! ```no_run
//! # use forgelink_client::*;
//! # async fn demo() -> Result<()> {
//! let connection = BuildConnection::connect(ConnectionParams::for_definition(
//!     BuildDefinition::empty("demo"),
//! ));
//! let (handler, _results) = channel_handler::<String>();
//! let mut builder = connection.phased_action();
//! builder.add_after_loading_action(ProjectNameAction, handler)?;
//! builder.build().for_tasks(["assemble"])?.run().await?;
//! # Ok(())
//! # }
//! # struct ProjectNameAction;
//! # #[async_trait::async_trait]
//! # impl BuildAction for ProjectNameAction {
//! #     type Output = String;
//! #     async fn execute(&self, ctx: &mut ActionContext<'_>) -> std::result::Result<String, ActionFailure> {
//! #         Ok(ctx.model().root_project.name.clone())
//! #     }
//! # }
//! ```

pub mod action;
pub mod connection;
pub mod error;
pub mod executor;
pub mod handler;

pub use action::BuildAction;
pub use connection::{BuildConnection, ConnectionParams};
pub use error::{ClientError, Result};
pub use executor::{PhasedBuildActionBuilder, PhasedBuildActionExecutor};
pub use handler::{channel_handler, ChannelHandler, FnHandler, ResultHandler};

pub use forgelink_core::{BuildModel, BuildPhase, PhaseResult, SerializedPayload, TaskOutcome};
pub use forgelink_engine::{
    ActionContext, ActionFailure, BuildDefinition, BuildOutcome, CancellationSource,
    CancellationToken, EngineCapabilities, ProjectSpec, TaskSpec,
};
