//! Result handlers and the internal dispatch path from phase results to them.

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use forgelink_core::{BuildPhase, PhaseResult};
use forgelink_engine::ActionFailure;

use crate::error::ClientError;

/// Callback receiving either the successful result or the failure of an
/// action, or of the overall run.
pub trait ResultHandler<T>: Send {
    fn on_complete(&self, value: T);
    fn on_failure(&self, error: ClientError);
}

/// Handler built from a pair of closures.
pub struct FnHandler<C, F> {
    complete: C,
    failure: F,
}

impl<C, F> FnHandler<C, F> {
    pub fn new(complete: C, failure: F) -> Self {
        Self { complete, failure }
    }
}

impl<T, C, F> ResultHandler<T> for FnHandler<C, F>
where
    C: Fn(T) + Send,
    F: Fn(ClientError) + Send,
{
    fn on_complete(&self, value: T) {
        (self.complete)(value);
    }

    fn on_failure(&self, error: ClientError) {
        (self.failure)(error);
    }
}

/// Handler forwarding outcomes into an unbounded channel.
pub struct ChannelHandler<T> {
    sender: mpsc::UnboundedSender<std::result::Result<T, ClientError>>,
}

impl<T: Send> ResultHandler<T> for ChannelHandler<T> {
    fn on_complete(&self, value: T) {
        let _ = self.sender.send(Ok(value));
    }

    fn on_failure(&self, error: ClientError) {
        let _ = self.sender.send(Err(error));
    }
}

/// Create a channel-backed handler together with the receiving end.
pub fn channel_handler<T: Send>() -> (
    ChannelHandler<T>,
    mpsc::UnboundedReceiver<std::result::Result<T, ClientError>>,
) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelHandler { sender }, receiver)
}

/// Type-erased bridge from a wire-form [`PhaseResult`] to a typed handler.
pub(crate) trait PhaseDispatcher: Send {
    fn phase(&self) -> BuildPhase;
    fn dispatch(&self, result: &PhaseResult);
}

pub(crate) struct TypedDispatcher<T> {
    phase: BuildPhase,
    handler: Box<dyn ResultHandler<T>>,
}

impl<T> TypedDispatcher<T> {
    pub(crate) fn new(phase: BuildPhase, handler: Box<dyn ResultHandler<T>>) -> Self {
        Self { phase, handler }
    }
}

impl<T: DeserializeOwned + Send> PhaseDispatcher for TypedDispatcher<T> {
    fn phase(&self) -> BuildPhase {
        self.phase
    }

    fn dispatch(&self, result: &PhaseResult) {
        if let Some(payload) = result.result_payload() {
            match payload.deserialize::<T>() {
                Ok(value) => self.handler.on_complete(value),
                Err(error) => self.handler.on_failure(ClientError::Core(error)),
            }
        } else if let Some(payload) = result.failure_payload() {
            let message = payload
                .deserialize::<ActionFailure>()
                .map(|f| f.message)
                .unwrap_or_else(|_| "action failed with an undecodable failure".to_string());
            self.handler.on_failure(ClientError::ActionFailed {
                phase: self.phase,
                message,
            });
        }
    }
}
