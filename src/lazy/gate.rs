//! Gates that hold a consumer back until its libraries are loaded.
//!
//! Both gates resolve their library request once, when mounted, and keep
//! that list for their whole lifetime so [`key`](InjectGate::key) stays
//! stable while loads complete.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::catalog::LibraryRequest;
use super::loadable::LibraryValue;
use super::registry::LazyRegistry;
use super::LazyError;

/// Loaded libraries handed to an activated consumer, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct LoadedLibraries(BTreeMap<String, LibraryValue>);

impl LoadedLibraries {
    pub fn get(&self, name: &str) -> Option<&LibraryValue> {
        self.0.get(name)
    }

    /// Downcasts the library `name` to `T`.
    pub fn get_as<T: std::any::Any>(&self, name: &str) -> Option<&T> {
        self.get(name)?.downcast_ref()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, LibraryValue> {
        self.0
    }
}

fn trigger(registry: &LazyRegistry, libraries: &[String]) -> Result<(), LazyError> {
    for name in libraries {
        registry.ensure_loading(name)?;
    }
    Ok(())
}

/// Starts loading libraries ahead of time and otherwise stays out of the way.
///
/// The consumer always runs; it is never re-run because a load finished.
#[derive(Debug)]
pub struct PreloadGate<F> {
    registry: LazyRegistry,
    libraries: Vec<String>,
    consumer: F,
}

impl<F> PreloadGate<F> {
    pub fn mount(
        registry: &LazyRegistry,
        request: impl Into<LibraryRequest>,
        consumer: F,
    ) -> Result<Self, LazyError> {
        let libraries = registry.resolve(request)?;
        trigger(registry, &libraries)?;
        debug!(libraries = %libraries.join(","), "mounted preload gate");
        Ok(Self {
            registry: registry.clone(),
            libraries,
            consumer,
        })
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn key(&self) -> String {
        self.libraries.join("|")
    }

    pub fn observe<P, R>(&mut self, props: P) -> R
    where
        F: FnMut(P) -> R,
    {
        if let Err(err) = trigger(&self.registry, &self.libraries) {
            warn!(error = %err, "preload gate could not trigger loading");
        }
        (self.consumer)(props)
    }
}

/// Runs its consumer only once every requested library is loaded, passing
/// the loaded values along with the consumer's own input.
#[derive(Debug)]
pub struct InjectGate<F> {
    registry: LazyRegistry,
    libraries: Vec<String>,
    consumer: F,
}

impl<F> InjectGate<F> {
    pub fn mount(
        registry: &LazyRegistry,
        request: impl Into<LibraryRequest>,
        consumer: F,
    ) -> Result<Self, LazyError> {
        let libraries = registry.resolve(request)?;
        trigger(registry, &libraries)?;
        debug!(libraries = %libraries.join(","), "mounted inject gate");
        Ok(Self {
            registry: registry.clone(),
            libraries,
            consumer,
        })
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn key(&self) -> String {
        self.libraries.join("|")
    }

    /// The requested libraries that are loaded right now.
    pub fn loaded(&self) -> LoadedLibraries {
        LoadedLibraries(self.registry.with_state(|state| state.loaded_subset(&self.libraries)))
    }

    pub fn is_ready(&self) -> bool {
        self.is_complete(&self.loaded())
    }

    // Duplicate names in the request count once.
    fn is_complete(&self, loaded: &LoadedLibraries) -> bool {
        self.libraries.iter().all(|name| loaded.get(name).is_some())
    }

    /// Runs the consumer if everything is loaded, otherwise returns `None`.
    ///
    /// Each call is one render. Once the libraries are loaded the consumer
    /// runs on every call, with the same values each time; while any is
    /// missing it never runs. The gate keeps no "already activated" flag.
    pub fn observe<P, R>(&mut self, props: P) -> Option<R>
    where
        F: FnMut(P, LoadedLibraries) -> R,
    {
        if let Err(err) = trigger(&self.registry, &self.libraries) {
            warn!(error = %err, "inject gate could not trigger loading");
        }

        let loaded = self.loaded();
        if !self.is_complete(&loaded) {
            return None;
        }
        Some((self.consumer)(props, loaded))
    }

    /// Waits until every requested library is loaded.
    pub async fn ready(&self) -> Result<LoadedLibraries, LazyError> {
        let mut updates = self.registry.subscribe();
        let state = updates
            .wait_for(|state| self.libraries.iter().all(|name| state.contains(name)))
            .await
            .map_err(|_| LazyError::RegistryClosed)?;
        Ok(LoadedLibraries(state.loaded_subset(&self.libraries)))
    }

    /// Waits for the libraries, then runs the consumer.
    pub async fn activate<P, R>(&mut self, props: P) -> Result<R, LazyError>
    where
        F: FnMut(P, LoadedLibraries) -> R,
    {
        let loaded = self.ready().await?;
        Ok((self.consumer)(props, loaded))
    }
}
