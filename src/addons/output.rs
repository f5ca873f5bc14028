use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::codegen::{generate, GeneratedModule};
use super::AddonError;
use crate::settings::LoaderSettings;

const FILE_PREFIX: &str = "addons-loader-";

impl GeneratedModule {
    /// Writes the module to a fresh, uniquely named file in `dir` and keeps it.
    pub fn write_to(&self, dir: impl AsRef<Path>, suffix: &str) -> Result<PathBuf, AddonError> {
        let dir = dir.as_ref();
        let write_err = |source| AddonError::Write {
            path: dir.to_path_buf(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)
            .map_err(write_err)?;
        file.write_all(self.source().as_bytes()).map_err(write_err)?;

        let (_, path) = file.keep().map_err(|e| write_err(e.error))?;
        info!(path = %path.display(), "wrote addon loader");
        Ok(path)
    }

    /// Writes the module into the system temp directory.
    pub fn write_temp(&self, suffix: &str) -> Result<PathBuf, AddonError> {
        self.write_to(std::env::temp_dir(), suffix)
    }
}

/// Generates the loader for `addons` and writes it where `settings` say.
///
/// The returned path is for an external module loader to consume; removing
/// the file afterwards is the caller's business.
pub fn write_loader<I, S>(addons: I, settings: &LoaderSettings) -> Result<PathBuf, AddonError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let module = generate(addons)?;
    match &settings.dir {
        Some(dir) => module.write_to(dir, &settings.suffix),
        None => module.write_temp(&settings.suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_loader_persists_source() {
        let dir = TempDir::new().unwrap();
        let settings = LoaderSettings {
            suffix: ".mjs".to_string(),
            dir: Some(dir.path().to_path_buf()),
        };

        let path = write_loader(["volto-tabs"], &settings).unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mjs"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("import voltoTabs from 'volto-tabs';"));
    }

    #[test]
    fn test_each_write_gets_a_new_file() {
        let dir = TempDir::new().unwrap();
        let module = generate(["pkg"]).unwrap();

        let first = module.write_to(dir.path(), ".js").unwrap();
        let second = module.write_to(dir.path(), ".js").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let module = generate(["pkg"]).unwrap();
        let err = module.write_to("/nonexistent/dragon-addons", ".js").unwrap_err();
        assert!(matches!(err, AddonError::Write { .. }));
    }

    #[test]
    fn test_malformed_addon_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = LoaderSettings {
            suffix: ".js".to_string(),
            dir: Some(dir.path().to_path_buf()),
        };

        assert!(write_loader([":nothing"], &settings).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
