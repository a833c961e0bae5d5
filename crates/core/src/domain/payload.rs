use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::BuildPhase;

/// Opaque serialized value passed across the client/engine boundary.
///
/// The bytes are produced by the side that owns the value; interpretation is
/// entirely up to the consuming side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerializedPayload {
    /// Optional metadata describing the serialized value (type tag, version).
    pub header: Option<serde_json::Value>,
    /// The serialized value itself.
    pub bytes: Vec<u8>,
}

impl SerializedPayload {
    /// Serialize a value into an opaque payload.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, CoreError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CoreError::PayloadCodec(e.to_string()))?;
        Ok(Self {
            header: None,
            bytes,
        })
    }

    /// Attach a header describing the payload.
    pub fn with_header(mut self, header: serde_json::Value) -> Self {
        self.header = Some(header);
        self
    }

    /// Deserialize the payload back into a concrete type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        serde_json::from_slice(&self.bytes).map_err(|e| CoreError::PayloadCodec(e.to_string()))
    }
}

/// Outcome of one phased action, dispatched from the engine to the client.
///
/// Exactly one of the success and failure payloads is populated. The fields
/// are private and the only constructors are [`PhaseResult::success`] and
/// [`PhaseResult::failure`], so an instance carrying both cannot be built;
/// deserialization goes through the same validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "PhaseResultWire", into = "PhaseResultWire")]
pub struct PhaseResult {
    result: Option<SerializedPayload>,
    failure: Option<SerializedPayload>,
    phase: BuildPhase,
}

impl PhaseResult {
    /// Create a successful result for the given phase.
    pub fn success(phase: BuildPhase, payload: SerializedPayload) -> Self {
        Self {
            result: Some(payload),
            failure: None,
            phase,
        }
    }

    /// Create a failed result for the given phase.
    pub fn failure(phase: BuildPhase, payload: SerializedPayload) -> Self {
        Self {
            result: None,
            failure: Some(payload),
            phase,
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn result_payload(&self) -> Option<&SerializedPayload> {
        self.result.as_ref()
    }

    pub fn failure_payload(&self) -> Option<&SerializedPayload> {
        self.failure.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

/// Wire form of [`PhaseResult`], validated on the way in.
#[derive(Serialize, Deserialize)]
struct PhaseResultWire {
    result: Option<SerializedPayload>,
    failure: Option<SerializedPayload>,
    phase: BuildPhase,
}

impl TryFrom<PhaseResultWire> for PhaseResult {
    type Error = CoreError;

    fn try_from(wire: PhaseResultWire) -> Result<Self, Self::Error> {
        match (&wire.result, &wire.failure) {
            (Some(_), Some(_)) => Err(CoreError::Validation(format!(
                "phase result for {} has both success and failure payloads",
                wire.phase
            ))),
            (None, None) => Err(CoreError::Validation(format!(
                "phase result for {} has neither success nor failure payload",
                wire.phase
            ))),
            _ => Ok(Self {
                result: wire.result,
                failure: wire.failure,
                phase: wire.phase,
            }),
        }
    }
}

impl From<PhaseResult> for PhaseResultWire {
    fn from(value: PhaseResult) -> Self {
        Self {
            result: value.result,
            failure: value.failure,
            phase: value.phase,
        }
    }
}
