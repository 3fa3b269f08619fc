//! Access credential lookup from the host environment

use std::fmt;

use log::{debug, warn};

use crate::{
    context::HostContext,
    error::{EmbedError, Result},
};

/// Resource key holding the navigation SDK access token
pub const ACCESS_TOKEN_KEY: &str = "mapbox_access_token";

/// Environment variable consulted by [`EnvCredentialResolver::default`]
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Outcome of resolving the access credential for one view
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// The credential was found
    Present(String),
    /// No resource was found under `key`
    Absent {
        /// Resource key that was looked up
        key: String,
    },
}

impl Credential {
    /// Returns the token if present
    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::Present(token) => Some(token),
            Credential::Absent { .. } => None,
        }
    }

    /// Whether a token was resolved
    pub fn is_present(&self) -> bool {
        matches!(self, Credential::Present(_))
    }

    /// Folds a resolver result into a credential, logging the miss
    pub fn from_lookup(key: &str, result: Result<String>) -> Self {
        match result {
            Ok(token) => Credential::Present(token),
            Err(err) => {
                warn!("Credential {} unresolved, continuing without it: {}", key, err);
                Credential::Absent { key: key.to_owned() }
            }
        }
    }
}

// Tokens end up in logs through `{:?}` on views and configs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Present(token) => {
                let prefix: String = token.chars().take(3).collect();
                write!(f, "Present({prefix}***)")
            }
            Credential::Absent { key } => f.debug_struct("Absent").field("key", key).finish(),
        }
    }
}

/// Looks up a named credential for a host context
pub trait CredentialResolver: Send + Sync {
    /// Returns the credential value or [`EmbedError::CredentialNotFound`]
    fn resolve(&self, context: &dyn HostContext, key: &str) -> Result<String>;
}

/// Resolves credentials from the host's string resources
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceCredentialResolver;

impl CredentialResolver for ResourceCredentialResolver {
    fn resolve(&self, context: &dyn HostContext, key: &str) -> Result<String> {
        match context.string_resource(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => {
                debug!(
                    "String resource {} missing from {}",
                    key,
                    context.package_name()
                );
                Err(EmbedError::CredentialNotFound { key: key.to_owned() })
            }
        }
    }
}

/// Resolves credentials from a process environment variable
#[derive(Debug, Clone)]
pub struct EnvCredentialResolver {
    var: String,
}

impl EnvCredentialResolver {
    /// Reads the credential from `var`, ignoring the requested key
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialResolver {
    fn default() -> Self {
        Self::new(ACCESS_TOKEN_ENV)
    }
}

impl CredentialResolver for EnvCredentialResolver {
    fn resolve(&self, _context: &dyn HostContext, key: &str) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(EmbedError::CredentialNotFound { key: key.to_owned() }),
        }
    }
}

/// Tries each resolver in order and returns the first hit
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn CredentialResolver>>,
}

impl ResolverChain {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver to the chain
    pub fn with(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl CredentialResolver for ResolverChain {
    fn resolve(&self, context: &dyn HostContext, key: &str) -> Result<String> {
        for resolver in &self.resolvers {
            if let Ok(value) = resolver.resolve(context, key) {
                return Ok(value);
            }
        }
        Err(EmbedError::CredentialNotFound { key: key.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Resources(HashMap<&'static str, &'static str>);

    impl HostContext for Resources {
        fn package_name(&self) -> &str {
            "com.example.host"
        }

        fn string_resource(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|v| v.to_string())
        }
    }

    struct Fixed(&'static str);

    impl CredentialResolver for Fixed {
        fn resolve(&self, _context: &dyn HostContext, _key: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn resource_lookup_hit() {
        let ctx = Resources(HashMap::from([(ACCESS_TOKEN_KEY, "pk.abc")]));
        let token = ResourceCredentialResolver.resolve(&ctx, ACCESS_TOKEN_KEY);
        assert_eq!(token, Ok("pk.abc".to_string()));
    }

    #[test]
    fn resource_lookup_miss_is_not_found() {
        let ctx = Resources(HashMap::new());
        let err = ResourceCredentialResolver
            .resolve(&ctx, ACCESS_TOKEN_KEY)
            .unwrap_err();
        assert_eq!(
            err,
            EmbedError::CredentialNotFound {
                key: ACCESS_TOKEN_KEY.into()
            }
        );
    }

    #[test]
    fn empty_resource_is_not_found() {
        let ctx = Resources(HashMap::from([(ACCESS_TOKEN_KEY, "  ")]));
        assert!(ResourceCredentialResolver.resolve(&ctx, ACCESS_TOKEN_KEY).is_err());
    }

    #[test]
    fn chain_falls_through_in_order() {
        let ctx = Resources(HashMap::new());
        let chain = ResolverChain::new()
            .with(ResourceCredentialResolver)
            .with(Fixed("pk.fallback"))
            .with(Fixed("pk.never"));
        assert_eq!(
            chain.resolve(&ctx, ACCESS_TOKEN_KEY),
            Ok("pk.fallback".to_string())
        );
    }

    #[test]
    fn empty_chain_is_not_found() {
        let ctx = Resources(HashMap::new());
        assert!(ResolverChain::new().resolve(&ctx, ACCESS_TOKEN_KEY).is_err());
    }

    #[test]
    fn env_resolver_missing_var() {
        let ctx = Resources(HashMap::new());
        let resolver = EnvCredentialResolver::new("NAVIGATION_EMBEDDED_TEST_UNSET_VAR");
        assert!(resolver.resolve(&ctx, ACCESS_TOKEN_KEY).is_err());
    }

    #[test]
    fn credential_from_lookup() {
        let absent =
            Credential::from_lookup("k", Err(EmbedError::CredentialNotFound { key: "k".into() }));
        assert_eq!(absent, Credential::Absent { key: "k".into() });
        assert_eq!(absent.token(), None);

        let present = Credential::from_lookup("k", Ok("pk.abc".to_string()));
        assert!(present.is_present());
        assert_eq!(present.token(), Some("pk.abc"));
    }

    #[test]
    fn debug_redacts_token() {
        let shown = format!("{:?}", Credential::Present("pk.secretvalue".into()));
        assert_eq!(shown, "Present(pk.***)");
        assert!(!shown.contains("secret"));
    }
}
