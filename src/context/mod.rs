//! Application context carrying configuration and the lazy library store.

use crate::lazy::{LazyCatalog, LazyRegistry};
use crate::Error;

/// Central application context.
///
/// Holds the deserialized configuration `C` and the [`LazyRegistry`] that
/// consumers share. Passing the registry through the context instead of a
/// global keeps each context, and each test, isolated.
///
/// ## Example
///
/// ```no_run
/// use dragon_addons::lazy::{LazyCatalog, LazyRegistry};
/// use dragon_addons::{AddonSettings, AppContext, Settings};
///
/// let settings: AddonSettings = Settings::builder()
///     .with_file("addons.toml", true)
///     .build()?;
/// let catalog = LazyCatalog::new().with_bundles(settings.lazy_bundles.clone());
///
/// let ctx = AppContext::builder()
///     .with_config(settings)
///     .with_registry(LazyRegistry::new(catalog))
///     .build()?;
///
/// let addons = &ctx.config().addons;
/// # Ok::<(), dragon_addons::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C> {
    config: C,
    registry: LazyRegistry,
}

impl<C> AppContext<C> {
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn registry(&self) -> &LazyRegistry {
        &self.registry
    }
}

impl AppContext<()> {
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder {
            config: None,
            registry: None,
        }
    }
}

/// Builder for an [`AppContext`].
///
/// Starts without a config (`AppContextBuilder<()>`) and becomes
/// `AppContextBuilder<C>` once [`with_config`](Self::with_config) is called.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: Option<C>,
    registry: Option<LazyRegistry>,
}

impl AppContextBuilder<()> {
    pub fn with_config<C>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config: Some(config),
            registry: self.registry,
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Without a registry, the context gets one with an empty catalog.
    pub fn with_registry(mut self, registry: LazyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<AppContext<C>, Error> {
        Ok(AppContext {
            config: self.config.ok_or(Error::MissingConfig)?,
            registry: self
                .registry
                .unwrap_or_else(|| LazyRegistry::new(LazyCatalog::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::LibraryValue;

    #[test]
    fn test_missing_config() {
        let result = AppContext::builder().build();
        assert!(matches!(result, Err(Error::MissingConfig)));
    }

    #[test]
    fn test_default_registry_is_empty() {
        let ctx = AppContext::builder().with_config(1u8).build().unwrap();
        assert!(ctx.registry().snapshot().is_empty());
        assert_eq!(*ctx.config(), 1);
    }

    #[test]
    fn test_registry_is_shared_not_global() {
        let registry = LazyRegistry::new(LazyCatalog::new());
        let ctx = AppContext::builder()
            .with_registry(registry.clone())
            .with_config("cfg")
            .build()
            .unwrap();
        let other = AppContext::builder().with_config("cfg").build().unwrap();

        registry.record_loaded("libX", LibraryValue::new(()));
        assert!(ctx.registry().snapshot().contains("libX"));
        assert!(!other.registry().snapshot().contains("libX"));
    }
}
