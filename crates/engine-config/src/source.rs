use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

/// Read-only key/value lookup with typed conversion.
///
/// Everything the engine reads from configuration goes through this trait;
/// backing formats (maps, process environment, files) live behind it.
pub trait ConfigSource: Send + Sync {
    /// Raw string value for the key, if any.
    fn raw(&self, key: &str) -> Option<String>;
}

impl dyn ConfigSource + '_ {
    /// Converted value for the key. A present but unparseable value is
    /// treated as absent, with a warning naming the key.
    pub fn property<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key, value = %raw, "Configuration value has the wrong type");
                None
            }
        }
    }
}

/// In-memory source, mainly for tests and embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        MapConfigSource::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigSource for MapConfigSource {
    fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Source backed by process environment variables.
///
/// `eventstore.enabled` under prefix `WIKI` resolves from
/// `WIKI_EVENTSTORE_ENABLED`.
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    prefix: String,
}

impl EnvConfigSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        EnvConfigSource {
            prefix: prefix.into(),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let suffix = key.replace(['.', '-'], "_").to_uppercase();
        format!("{}_{}", self.prefix, suffix)
    }
}

impl ConfigSource for EnvConfigSource {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(self.env_key(key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_dyn(source: &MapConfigSource) -> &dyn ConfigSource {
        source
    }

    #[test]
    fn typed_lookup_converts_known_values() {
        let source = MapConfigSource::new()
            .with("feature.enabled", "true")
            .with("page.size", " 100 ");

        assert_eq!(as_dyn(&source).property::<bool>("feature.enabled"), Some(true));
        assert_eq!(as_dyn(&source).property::<usize>("page.size"), Some(100));
    }

    #[test]
    fn unparseable_values_read_as_absent() {
        let source = MapConfigSource::new().with("page.size", "not-a-number");

        assert_eq!(as_dyn(&source).property::<usize>("page.size"), None);
        assert_eq!(as_dyn(&source).property::<usize>("missing"), None);
    }

    #[test]
    fn env_keys_are_prefixed_and_uppercased() {
        let source = EnvConfigSource::new("WIKI");
        assert_eq!(source.env_key("eventstore.enabled"), "WIKI_EVENTSTORE_ENABLED");
        assert_eq!(source.env_key("some-flag"), "WIKI_SOME_FLAG");
    }
}
