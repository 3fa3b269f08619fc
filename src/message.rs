//! JSON envelopes carried on view channels

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EmbedError, Result};

/// A call from host code into the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name, e.g. `startNavigation`
    pub method: String,
    /// Method arguments
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Creates a call with the given arguments
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Decodes a call from channel bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| EmbedError::decode("method call", e))
    }

    /// Encodes the call for the channel
    pub fn encode(&self) -> Vec<u8> {
        // Serializing a string and a `Value` cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// An event reported from the view to host code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, e.g. `routeBuilt`
    pub event: String,
    /// Event payload
    #[serde(default)]
    pub data: Value,
}

impl EventEnvelope {
    /// Creates an event with the given payload
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Decodes an event from channel bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| EmbedError::decode("view event", e))
    }

    /// Encodes the event for the channel
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}
