//! Error types for the embedding bridge

use thiserror::Error;

/// Errors raised while creating or driving an embedded navigation view
///
/// `MissingContext`, `TransportUnavailable`, `LayoutInflation` and
/// `InvalidArguments` abort view creation. `CredentialNotFound` and
/// `ThemeApplicationFailed` are absorbed by the factory and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    /// The host did not supply a rendering context
    #[error("no rendering context supplied for embedded view")]
    MissingContext,

    /// The named credential is not present in host resources
    #[error("credential resource `{key}` not found")]
    CredentialNotFound {
        /// Resource key that was looked up
        key: String,
    },

    /// The host transport cannot open channels
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The host window rejected the requested style
    #[error("failed to apply theme `{style}`: {reason}")]
    ThemeApplicationFailed {
        /// Style resource name
        style: String,
        /// Reason reported by the host
        reason: String,
    },

    /// The navigation layout could not be inflated
    #[error("failed to inflate layout `{0}`")]
    LayoutInflation(String),

    /// Creation arguments were not a map-like value
    #[error("invalid creation arguments: {0}")]
    InvalidArguments(String),

    /// A channel envelope or config document could not be decoded
    #[error("failed to decode {what}: {reason}")]
    Decode {
        /// What was being decoded
        what: &'static str,
        /// Decoder error message
        reason: String,
    },

    /// A message was sent on a channel that has already been closed
    #[error("channel `{0}` is closed")]
    ChannelClosed(String),

    /// A call into the host platform failed
    #[error("platform call failed: {0}")]
    Platform(String),
}

impl EmbedError {
    /// Wraps a JSON decoder error for the named input
    pub fn decode(what: &'static str, err: serde_json::Error) -> Self {
        EmbedError::Decode {
            what,
            reason: err.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EmbedError>;
