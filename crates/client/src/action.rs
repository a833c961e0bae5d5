//! Typed build actions and their erased engine form.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use forgelink_core::SerializedPayload;
use forgelink_engine::{ActionContext, ActionFailure, PhasedAction};

/// A client-supplied computation executed during one build phase.
///
/// The output is serialized into an opaque payload for the trip back from the
/// engine and decoded again before the registered handler sees it, honoring
/// the process-boundary contract even for the in-process engine.
#[async_trait]
pub trait BuildAction: Send + Sync {
    type Output: Serialize + DeserializeOwned + Send;

    async fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<Self::Output, ActionFailure>;
}

/// Adapter erasing a typed [`BuildAction`] into the engine's dispatch form.
pub(crate) struct ErasedAction<A> {
    inner: A,
}

impl<A> ErasedAction<A> {
    pub(crate) fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: BuildAction> PhasedAction for ErasedAction<A> {
    async fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<SerializedPayload, ActionFailure> {
        let value = self.inner.execute(ctx).await?;
        let payload = SerializedPayload::from_value(&value)
            .map_err(|e| ActionFailure::new(e.to_string()))?
            .with_header(serde_json::json!({
                "output": std::any::type_name::<A::Output>(),
            }));
        Ok(payload)
    }
}
