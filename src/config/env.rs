use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use super::ConfigError;

/// Case-folded view of the variables settings are read from.
///
/// Built from an optional `.env` file with the process environment laid over
/// it. Keys are stored in ASCII lowercase, and blank values are dropped so they
/// count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    /// Reads `env_file` if it exists, then overlays the current process environment.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let process = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::layered(env_file, process)
    }

    /// Same as [`EnvSource::load`] with an explicit process layer.
    pub fn layered<I, K, V>(env_file: &Path, process: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::default();

        if env_file.is_file() {
            let env_error = |source| ConfigError::EnvFile {
                path: env_file.to_path_buf(),
                source,
            };
            let entries = dotenvy::from_path_iter(env_file)
                .map_err(env_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(env_error)?;
            info!(path = %env_file.display(), entries = entries.len(), "📄 .env loaded");
            source.overlay(entries);
        } else {
            warn!(
                path = %env_file.display(),
                ".env file not found, using process environment only"
            );
        }

        source.overlay(process);
        Ok(source)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::default();
        source.overlay(pairs);
        source
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub(super) fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.vars)
    }

    /// Lays one source over the current values.
    ///
    /// Inside a single layer the exact-lowercase spelling of a key beats any
    /// other casing, regardless of order.
    fn overlay<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut layer: BTreeMap<String, (bool, String)> = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            let folded = key.to_ascii_lowercase();
            let exact = folded == key;
            if !exact && matches!(layer.get(&folded), Some((true, _))) {
                continue;
            }
            layer.insert(folded, (exact, value.into()));
        }

        for (key, (_, value)) in layer {
            if value.trim().is_empty() {
                self.vars.remove(&key);
            } else {
                self.vars.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "api-scaffold-{}-{name}.env",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn process_values_override_env_file() {
        let path = scratch_file("override", "app_name=from-file\nenv=dev\n");

        let source = EnvSource::layered(&path, [("app_name", "from-process")]).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(source.get("app_name"), Some("from-process"));
        assert_eq!(source.get("env"), Some("dev"));
    }

    #[test]
    fn missing_env_file_falls_back_to_process() {
        let path = std::env::temp_dir().join("api-scaffold-does-not-exist.env");

        let source = EnvSource::layered(&path, [("env", "prod")]).unwrap();

        assert_eq!(source.get("env"), Some("prod"));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let source = EnvSource::from_pairs([("DATABASE_URL", "postgres://db")]);

        assert_eq!(source.get("database_url"), Some("postgres://db"));
        assert_eq!(source.get("Database_Url"), Some("postgres://db"));
    }

    #[test]
    fn lowercase_spelling_wins_within_a_layer() {
        let source = EnvSource::from_pairs([("env", "lower"), ("ENV", "upper")]);
        assert_eq!(source.get("env"), Some("lower"));

        let source = EnvSource::from_pairs([("ENV", "upper"), ("env", "lower")]);
        assert_eq!(source.get("env"), Some("lower"));
    }

    #[test]
    fn blank_values_are_dropped() {
        let path = scratch_file("blank", "secret_key=from-file\n");

        let source = EnvSource::layered(&path, [("secret_key", "  "), ("env", "")]).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(source.get("secret_key"), None);
        assert_eq!(source.get("env"), None);
        assert!(source.is_empty());
    }
}
