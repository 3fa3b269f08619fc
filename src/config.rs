//! Factory configuration

use serde::{Deserialize, Serialize};

use crate::{
    channel::CHANNEL_NAMESPACE,
    credential::ACCESS_TOKEN_KEY,
    error::{EmbedError, Result},
    theme::DEFAULT_THEME,
};

/// Layout inflated for every navigation view
pub const DEFAULT_LAYOUT: &str = "navigation_activity";

/// Settings for an [`EmbeddedViewFactory`](crate::EmbeddedViewFactory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Namespace channel names are derived from
    pub channel_namespace: String,
    /// Resource key holding the access token
    pub credential_key: String,
    /// Layout inflated for each view
    pub layout: String,
    /// Window style applied on creation; `None` leaves the window alone
    pub theme: Option<String>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            channel_namespace: CHANNEL_NAMESPACE.to_string(),
            credential_key: ACCESS_TOKEN_KEY.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
            theme: Some(DEFAULT_THEME.to_string()),
        }
    }
}

impl FactoryConfig {
    /// Parses a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EmbedError::decode("factory config", e))
    }

    /// Same config without the window theme step
    pub fn without_theme(mut self) -> Self {
        self.theme = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.channel_namespace, "flutter_mapbox_navigation");
        assert_eq!(config.credential_key, "mapbox_access_token");
        assert_eq!(config.theme.as_deref(), Some("Theme.AppCompat.NoActionBar"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = FactoryConfig::from_json(r#"{"channel_namespace":"nav"}"#).unwrap();
        assert_eq!(config.channel_namespace, "nav");
        assert_eq!(config.layout, DEFAULT_LAYOUT);
    }

    #[test]
    fn null_theme_disables_step() {
        let config = FactoryConfig::from_json(r#"{"theme":null}"#).unwrap();
        assert_eq!(config.theme, None);
        assert_eq!(FactoryConfig::default().without_theme().theme, None);
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            FactoryConfig::from_json("{"),
            Err(EmbedError::Decode { what: "factory config", .. })
        ));
    }
}
