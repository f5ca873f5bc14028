//! Load-once cache of lazily loaded libraries.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::catalog::{LazyCatalog, LibraryRequest};
use super::loadable::LibraryValue;
use super::LazyError;

/// Libraries that have finished loading. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    entries: HashMap<String, LibraryValue>,
}

impl RegistryState {
    pub fn get(&self, name: &str) -> Option<&LibraryValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The loaded values among `names`, keyed by name.
    pub fn loaded_subset<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, LibraryValue> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.entries
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }
}

struct Inner {
    catalog: LazyCatalog,
    state: watch::Sender<RegistryState>,
    in_flight: Mutex<HashSet<String>>,
}

/// Shared handle to the loaded-library store.
///
/// Each library is loaded at most once per registry: a name that is loaded
/// or already loading is never triggered again. Loads run on the ambient
/// tokio runtime and complete in no particular order.
///
/// ```no_run
/// use dragon_addons::lazy::{BoxError, LazyCatalog, LazyRegistry, LibraryValue, LoadFn};
///
/// # async fn run() -> Result<(), dragon_addons::lazy::LazyError> {
/// let catalog = LazyCatalog::new()
///     .with_loadable("prettier", LoadFn::new(|| async {
///         Ok::<_, BoxError>(LibraryValue::new("prettier"))
///     }));
/// let registry = LazyRegistry::new(catalog);
///
/// registry.ensure_loading("prettier")?;
/// let mut updates = registry.subscribe();
/// let _ = updates.wait_for(|state| state.contains("prettier")).await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LazyRegistry {
    inner: Arc<Inner>,
}

impl LazyRegistry {
    pub fn new(catalog: LazyCatalog) -> Self {
        let (state, _) = watch::channel(RegistryState::default());
        Self {
            inner: Arc::new(Inner {
                catalog,
                state,
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn catalog(&self) -> &LazyCatalog {
        &self.inner.catalog
    }

    pub fn resolve(&self, request: impl Into<LibraryRequest>) -> Result<Vec<String>, LazyError> {
        self.inner.catalog.resolve(request)
    }

    pub fn snapshot(&self) -> RegistryState {
        self.inner.state.borrow().clone()
    }

    /// Runs `f` against the current state without cloning it.
    ///
    /// Holds the state's read lock for the duration of `f`, so `f` must not
    /// record libraries.
    pub fn with_state<R>(&self, f: impl FnOnce(&RegistryState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Notified every time a library is recorded.
    pub fn subscribe(&self) -> watch::Receiver<RegistryState> {
        self.inner.state.subscribe()
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.inner.in_flight.lock().contains(name)
    }

    /// Starts loading `name` unless it is loaded or already loading.
    ///
    /// Returns whether a load was started. Must be called from within a
    /// tokio runtime. A rejected load is logged and forgotten, so a later
    /// call may try again.
    pub fn ensure_loading(&self, name: &str) -> Result<bool, LazyError> {
        let loadable = self
            .inner
            .catalog
            .loadable(name)
            .ok_or_else(|| LazyError::InvalidLibraryOrBundleName(name.to_string()))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| LazyError::NoRuntime(name.to_string()))?;

        {
            // The loaded check and the claim happen under the same lock that
            // `record_loaded` takes, so a name is never claimed twice.
            let mut in_flight = self.inner.in_flight.lock();
            if self.inner.state.borrow().contains(name) || !in_flight.insert(name.to_string()) {
                return Ok(false);
            }
        }

        debug!(library = name, "loading lazy library");
        let registry = self.clone();
        let name = name.to_string();
        runtime.spawn(async move {
            match loadable.load().await {
                Ok(value) => {
                    registry.record_loaded(&name, value);
                }
                Err(source) => {
                    registry.inner.in_flight.lock().remove(&name);
                    let err = LazyError::LoaderRejection { name, source };
                    warn!(error = %err, "lazy library failed to load");
                }
            }
        });

        Ok(true)
    }

    /// Triggers every library of `request`.
    pub fn ensure_all(&self, request: impl Into<LibraryRequest>) -> Result<Vec<String>, LazyError> {
        let libraries = self.resolve(request)?;
        for name in &libraries {
            self.ensure_loading(name)?;
        }
        Ok(libraries)
    }

    /// Stores a loaded value unless one is already present.
    ///
    /// The first completion wins; later ones are dropped. Returns whether
    /// the value was stored.
    pub fn record_loaded(&self, name: &str, value: LibraryValue) -> bool {
        let mut in_flight = self.inner.in_flight.lock();
        in_flight.remove(name);

        let stored = self.inner.state.send_if_modified(|state| {
            if state.contains(name) {
                return false;
            }
            state.entries.insert(name.to_string(), value);
            true
        });

        if stored {
            info!(library = name, "lazy library loaded");
        } else {
            debug!(library = name, "discarding duplicate load result");
        }
        stored
    }
}

impl fmt::Debug for LazyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRegistry")
            .field("catalog", &self.inner.catalog)
            .field("loaded", &self.inner.state.borrow().len())
            .field("in_flight", &self.inner.in_flight.lock().len())
            .finish()
    }
}
