//! Detector registry: maps a type name to a constructor.
//!
//! A registry is an explicit value owned by whoever builds the pipeline. A
//! process-wide default exists for convenience ([`register_default`] /
//! [`DetectorRegistry::from_defaults`]) but nothing requires it.

use crate::config::DetectorConfig;
use crate::detection::{Detector, DetectorKind};
use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Constructor for a detector instance.
pub type DetectorFactory =
    Arc<dyn Fn(&DetectorConfig) -> CoreResult<Box<dyn Detector>> + Send + Sync>;

#[derive(Clone)]
struct RegistryEntry {
    kind: DetectorKind,
    factory: DetectorFactory,
}

/// Maps detector type names to their capability marker and factory.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    entries: HashMap<String, RegistryEntry>,
}

static DEFAULT_REGISTRY: Lazy<RwLock<DetectorRegistry>> =
    Lazy::new(|| RwLock::new(DetectorRegistry::new()));

/// Adds a detector type to the process-wide default registry.
pub fn register_default<F>(type_name: &str, kind: DetectorKind, factory: F)
where
    F: Fn(&DetectorConfig) -> CoreResult<Box<dyn Detector>> + Send + Sync + 'static,
{
    match DEFAULT_REGISTRY.write() {
        Ok(mut registry) => registry.register(type_name, kind, factory),
        Err(poisoned) => poisoned.into_inner().register(type_name, kind, factory),
    }
}

impl DetectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process-wide default registry.
    pub fn from_defaults() -> Self {
        match DEFAULT_REGISTRY.read() {
            Ok(registry) => registry.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Registers (or replaces) a detector type.
    pub fn register<F>(&mut self, type_name: &str, kind: DetectorKind, factory: F)
    where
        F: Fn(&DetectorConfig) -> CoreResult<Box<dyn Detector>> + Send + Sync + 'static,
    {
        if self.entries.contains_key(type_name) {
            log::warn!("Replacing registered detector type '{}'", type_name);
        }
        self.entries.insert(
            type_name.to_string(),
            RegistryEntry {
                kind,
                factory: Arc::new(factory),
            },
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Capability marker of a registered type.
    pub fn kind_of(&self, type_name: &str) -> CoreResult<DetectorKind> {
        self.entries
            .get(type_name)
            .map(|entry| entry.kind)
            .ok_or_else(|| CoreError::UnknownDetectorType(type_name.to_string()))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Constructs a detector of `type_name` from `config`.
    ///
    /// Fails with [`CoreError::UnknownDetectorType`] for unregistered types.
    /// A factory error, or a detector that declares no categories, is
    /// reported as [`CoreError::DetectorInit`].
    pub fn create(&self, type_name: &str, config: &DetectorConfig) -> CoreResult<Box<dyn Detector>> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| CoreError::UnknownDetectorType(type_name.to_string()))?;

        let detector = (entry.factory)(config).map_err(|e| match e {
            err @ CoreError::DetectorInit { .. } => err,
            other => CoreError::DetectorInit {
                name: config.name.clone(),
                message: other.to_string(),
            },
        })?;

        if detector.categories().is_empty() {
            return Err(CoreError::DetectorInit {
                name: config.name.clone(),
                message: "detector declares no categories".to_string(),
            });
        }

        Ok(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionResult;
    use crate::media::{AudioBuffer, VideoFrame};
    use std::collections::BTreeSet;

    struct StaticDetector {
        name: String,
        categories: BTreeSet<String>,
    }

    impl Detector for StaticDetector {
        fn name(&self) -> &str {
            &self.name
        }

        fn categories(&self) -> &BTreeSet<String> {
            &self.categories
        }

        fn detect(
            &mut self,
            _frame: Option<&VideoFrame>,
            _audio: Option<&AudioBuffer>,
        ) -> CoreResult<Vec<DetectionResult>> {
            Ok(Vec::new())
        }
    }

    fn static_factory(config: &DetectorConfig) -> CoreResult<Box<dyn Detector>> {
        Ok(Box::new(StaticDetector {
            name: config.name.clone(),
            categories: config.categories.clone(),
        }))
    }

    #[test]
    fn test_create_registered_type() {
        let mut registry = DetectorRegistry::new();
        registry.register("static", DetectorKind::Frame, static_factory);

        let config = DetectorConfig::new("nsfw", "static", ["Nudity"]);
        let detector = registry.create("static", &config).unwrap();
        assert_eq!(detector.name(), "nsfw");
        assert_eq!(registry.kind_of("static").unwrap(), DetectorKind::Frame);
        assert_eq!(registry.type_names(), vec!["static".to_string()]);
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = DetectorRegistry::new();
        let config = DetectorConfig::new("x", "missing", ["A"]);
        assert!(matches!(
            registry.create("missing", &config),
            Err(CoreError::UnknownDetectorType(ref t)) if t == "missing"
        ));
        assert!(registry.kind_of("missing").is_err());
    }

    #[test]
    fn test_empty_categories_fail_construction() {
        let mut registry = DetectorRegistry::new();
        registry.register("static", DetectorKind::Frame, static_factory);
        let config = DetectorConfig::new("empty", "static", Vec::<String>::new());
        assert!(matches!(
            registry.create("static", &config),
            Err(CoreError::DetectorInit { .. })
        ));
    }

    #[test]
    fn test_factory_errors_are_wrapped() {
        let mut registry = DetectorRegistry::new();
        registry.register("broken", DetectorKind::FullAudio, |_config: &DetectorConfig| {
            Err(CoreError::OperationFailed("weights missing".to_string()))
        });
        let config = DetectorConfig::new("asr", "broken", ["Profanity"]);
        match registry.create("broken", &config) {
            Err(CoreError::DetectorInit { name, message }) => {
                assert_eq!(name, "asr");
                assert!(message.contains("weights missing"));
            }
            _ => panic!("expected DetectorInit error"),
        }
    }

    #[test]
    fn test_default_registry_snapshot() {
        register_default("default-static", DetectorKind::Frame, static_factory);
        let registry = DetectorRegistry::from_defaults();
        assert!(registry.contains("default-static"));
    }
}
