use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{merge_at_path, InlineSource, SettingsSource};
use super::SettingsError;

/// Builder for layering host settings from TOML files, inline TOML and the
/// environment.
///
/// Sources are merged in registration order, later ones overriding earlier
/// ones. Nested tables merge recursively; other values (including arrays,
/// so the addon list) are replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use dragon_addons::{AddonSettings, Settings};
///
/// let settings: AddonSettings = Settings::builder()
///     .with_file("addons.toml", true)
///     .with_env("DRAGON", "__")
///     .with_file("addons.local.toml", false)
///     .build()?;
/// # Ok::<(), dragon_addons::SettingsError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Settings {
    sources: Vec<Box<dyn SettingsSource>>,
}

impl Settings {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file. A missing `required` file fails the build.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables named `PREFIX<sep>SECTION<sep>KEY`.
    ///
    /// Path segments are lowercased. Values are coerced to boolean, integer,
    /// float, an inline array when written as `[...]`, or a string:
    ///
    /// ```text
    /// DRAGON__ADDONS='["volto-slate:asDefault", "volto-tabs"]'
    /// DRAGON__LOADER__SUFFIX=.mjs
    /// ```
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds settings written inline as TOML.
    pub fn with_toml_str(self, contents: impl Into<String>) -> Self {
        self.with_source(InlineSource::new(contents))
    }

    pub fn with_source(mut self, source: impl SettingsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Merges every source and deserializes the result once.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, SettingsError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            let entries = source.entries()?;
            debug!(?source, entries = entries.len(), "merging settings source");
            for entry in entries {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(SettingsError::DeserializeError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AddonSettings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_later_sources_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "addons = [\"volto-tabs\"]\n[loader]\nsuffix = \".js\"").unwrap();

        let settings: AddonSettings = Settings::builder()
            .with_file(file.path(), true)
            .with_source(
                EnvSource::new("DRAGON", "__").with_vars([("DRAGON__LOADER__SUFFIX", ".mjs")]),
            )
            .build()
            .unwrap();

        assert_eq!(settings.addons, vec!["volto-tabs"]);
        assert_eq!(settings.loader.suffix, ".mjs");
    }

    #[test]
    fn test_env_array_replaces_addon_list() {
        let settings: AddonSettings = Settings::builder()
            .with_toml_str(r#"addons = ["a", "b"]"#)
            .with_source(
                EnvSource::new("DRAGON", "__")
                    .with_vars([("DRAGON__ADDONS", r#"["c:x,y"]"#)]),
            )
            .build()
            .unwrap();

        assert_eq!(settings.addons, vec!["c:x,y"]);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result: Result<AddonSettings, _> = Settings::builder()
            .with_file("/nonexistent/addons.toml", true)
            .build();
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }

    #[test]
    fn test_type_mismatch_fails_deserialize() {
        let result: Result<AddonSettings, _> =
            Settings::builder().with_toml_str("addons = 3").build();
        assert!(matches!(result, Err(SettingsError::DeserializeError(_))));
    }
}
