use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::DnsBackend;
use crate::config::BackendConfig;
use crate::error::Error;

/// Builds a backend instance from its validated configuration.
pub type BackendConstructor = fn(&BackendConfig) -> Result<Arc<dyn DnsBackend>, Error>;

/// Maps a backend type identifier to its constructor. Built once at startup
/// and read-only afterwards; passed explicitly to the assembly code so tests
/// can construct isolated registries.
pub struct BackendRegistry {
    constructors: HashMap<String, BackendConstructor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        BackendRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Registering the same type twice is refused rather than silently
    /// overridden.
    pub fn register(&mut self, type_id: &str, constructor: BackendConstructor) -> Result<(), Error> {
        if self.constructors.contains_key(type_id) {
            return Err(Error::DuplicateRegistration(type_id.to_string()));
        }
        self.constructors.insert(type_id.to_string(), constructor);
        Ok(())
    }

    pub fn create(
        &self,
        type_id: &str,
        cfg: &BackendConfig,
    ) -> Result<Arc<dyn DnsBackend>, Error> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| Error::UnknownBackendType(type_id.to_string()))?;
        constructor(cfg)
    }

    pub fn types(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Converge;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NullBackend;

    #[async_trait]
    impl DnsBackend for NullBackend {
        fn name(&self) -> &str {
            "null"
        }

        async fn converge(&self, _host: &str, _address: &str) -> Result<Converge, Error> {
            Ok(Converge::Unchanged)
        }
    }

    fn null_constructor(_cfg: &BackendConfig) -> Result<Arc<dyn DnsBackend>, Error> {
        Ok(Arc::new(NullBackend))
    }

    fn failing_constructor(cfg: &BackendConfig) -> Result<Arc<dyn DnsBackend>, Error> {
        Err(Error::InvalidCredentials(cfg.name.clone()))
    }

    #[test]
    fn test_create_invokes_registered_constructor() {
        let mut registry = BackendRegistry::new();
        registry.register("null", null_constructor).unwrap();

        let backend = registry.create("null", &BackendConfig::default()).unwrap();
        assert_eq!(backend.name(), "null");
    }

    #[test]
    fn test_duplicate_registration_is_refused() {
        let mut registry = BackendRegistry::new();
        registry.register("null", null_constructor).unwrap();

        let err = registry.register("null", null_constructor).unwrap_err();
        assert_matches!(err, Error::DuplicateRegistration(id) if id == "null");
    }

    #[test]
    fn test_unknown_type_is_refused() {
        let registry = BackendRegistry::new();

        let err = registry
            .create("route53", &BackendConfig::default())
            .unwrap_err();
        assert_matches!(err, Error::UnknownBackendType(id) if id == "route53");
    }

    #[test]
    fn test_constructor_error_is_propagated_unchanged() {
        let mut registry = BackendRegistry::new();
        registry.register("bad", failing_constructor).unwrap();

        let err = registry.create("bad", &BackendConfig::default()).unwrap_err();
        assert_matches!(err, Error::InvalidCredentials(_));
    }
}
