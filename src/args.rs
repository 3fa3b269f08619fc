//! Creation arguments supplied by the host with each view request

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EmbedError, Result};

/// Map-like arguments for a new view; absent arguments are an empty map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreationArgs(Map<String, Value>);

impl CreationArgs {
    /// Empty argument map
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes arguments from raw bytes delivered by the host
    ///
    /// An empty payload or JSON `null` is treated as absent.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| EmbedError::InvalidArguments(e.to_string()))?;
        Self::try_from(value)
    }

    /// Looks up an argument by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Value> for CreationArgs {
    type Error = EmbedError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(EmbedError::InvalidArguments(format!(
                "expected a map, got {other}"
            ))),
        }
    }
}

impl From<Map<String, Value>> for CreationArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payload_is_absent() {
        assert!(CreationArgs::from_slice(b"").unwrap().is_empty());
        assert!(CreationArgs::from_slice(b"null").unwrap().is_empty());
        assert!(CreationArgs::from_slice(b"{}").unwrap().is_empty());
    }

    #[test]
    fn map_payload() {
        let args = CreationArgs::from_slice(br#"{"language":"en","zoom":15}"#).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("language"), Some(&json!("en")));
    }

    #[test]
    fn non_map_payload_is_rejected() {
        assert!(matches!(
            CreationArgs::try_from(json!([1, 2])),
            Err(EmbedError::InvalidArguments(_))
        ));
        assert!(matches!(
            CreationArgs::from_slice(b"{not json"),
            Err(EmbedError::InvalidArguments(_))
        ));
    }
}
