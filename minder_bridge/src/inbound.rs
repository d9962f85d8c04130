use serde_json::Value;

use crate::{
    correlation::CorrelationId,
    error::{BridgeError, BridgeResult},
};

// -------------------------------------------------------------------------------------------------------

/// A notification pushed by the backend, addressed to one of the switchboard's entry points.
///
/// On the wire this is a json object tagged by `entry`, using the entry point names the host calls:
/// ```json
/// {"entry": "returnCall", "id": "k3J9aQ0pLm2X", "result": {"id": 4, "name": "ACME"}}
/// {"entry": "callBack", "id": "k3J9aQ0pLm2X", "args": [1]}
/// {"entry": "criticalCall", "id": "k3J9aQ0pLm2X", "args": [[0, 1, 30]]}
/// {"entry": "endCallback", "id": "k3J9aQ0pLm2X"}
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "entry")]
pub enum InboundMessage {
    /// one-shot: fulfill and deregister
    #[serde(rename = "returnCall")]
    ReturnCall {
        id: CorrelationId,
        #[serde(default)]
        result: Value,
    },

    /// repeating, unknown ids are ignored
    #[serde(rename = "callBack")]
    CallBack {
        id: CorrelationId,
        #[serde(default)]
        args: Vec<Value>,
    },

    /// repeating, unknown ids are an error
    #[serde(rename = "criticalCall", alias = "criticalCallBack")]
    CriticalCall {
        id: CorrelationId,
        #[serde(default)]
        args: Vec<Value>,
    },

    /// completion, deregisters without delivering anything
    #[serde(rename = "endCallback")]
    EndCallback { id: CorrelationId },
}

impl InboundMessage {
    pub fn parse(text: &str) -> BridgeResult<Self> {
        serde_json::from_str(text).map_err(|err| BridgeError::MalformedNotification {
            reason: err.to_string(),
        })
    }

    pub fn to_json(&self) -> BridgeResult<String> {
        serde_json::to_string(self).map_err(|err| BridgeError::MalformedNotification {
            reason: err.to_string(),
        })
    }

    pub fn id(&self) -> &CorrelationId {
        match self {
            InboundMessage::ReturnCall { id, .. }
            | InboundMessage::CallBack { id, .. }
            | InboundMessage::CriticalCall { id, .. }
            | InboundMessage::EndCallback { id } => id,
        }
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
