//! Invocation-time secret lookup.
//!
//! Keys are read on every call rather than at startup, so a missing key only
//! fails the request that needed it.

use std::collections::HashMap;
use std::env;

pub trait SecretStore: Send + Sync {
    /// Returns the secret, treating blank values as absent.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }
}

/// Fixed secret map, used by tests and embedded setups.
#[derive(Debug, Default, Clone)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretStore for StaticSecrets {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_static_secret_is_missing() {
        let secrets = StaticSecrets::new().with("A", "  ").with("B", "key");
        assert_eq!(secrets.get("A"), None);
        assert_eq!(secrets.get("B").as_deref(), Some("key"));
        assert_eq!(secrets.get("C"), None);
    }
}
