//! Known lazy libraries and the bundles that group them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::loadable::Loadable;
use super::LazyError;
use crate::settings::BundleMembers;

/// A library name, a bundle name, or a list mixing both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryRequest {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for LibraryRequest {
    fn from(name: &str) -> Self {
        LibraryRequest::One(name.to_string())
    }
}

impl From<String> for LibraryRequest {
    fn from(name: String) -> Self {
        LibraryRequest::One(name)
    }
}

impl From<Vec<String>> for LibraryRequest {
    fn from(names: Vec<String>) -> Self {
        LibraryRequest::Many(names)
    }
}

impl From<&[&str]> for LibraryRequest {
    fn from(names: &[&str]) -> Self {
        LibraryRequest::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LibraryRequest {
    fn from(names: [&str; N]) -> Self {
        LibraryRequest::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Registered loaders and bundles.
///
/// Library names and bundle names share one lookup; a name registered as
/// both resolves as the bundle.
#[derive(Clone, Default)]
pub struct LazyCatalog {
    loadables: HashMap<String, Arc<dyn Loadable>>,
    bundles: HashMap<String, Vec<String>>,
}

impl LazyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loadable(mut self, name: impl Into<String>, loadable: impl Loadable + 'static) -> Self {
        self.loadables.insert(name.into(), Arc::new(loadable));
        self
    }

    pub fn with_bundle<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bundles
            .insert(name.into(), members.into_iter().map(Into::into).collect());
        self
    }

    /// Adds the bundles declared in host settings.
    pub fn with_bundles<I>(mut self, bundles: I) -> Self
    where
        I: IntoIterator<Item = (String, BundleMembers)>,
    {
        for (name, members) in bundles {
            self.bundles.insert(name, members.into_vec());
        }
        self
    }

    pub fn is_library(&self, name: &str) -> bool {
        self.loadables.contains_key(name)
    }

    pub fn is_bundle(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    pub(crate) fn loadable(&self, name: &str) -> Option<Arc<dyn Loadable>> {
        self.loadables.get(name).cloned()
    }

    /// Flattens a request into library names, keeping order and duplicates.
    ///
    /// Bundles expand to their member list as configured. A bundle none of
    /// whose members is known is rejected, as is any name that is neither a
    /// library nor a bundle.
    pub fn resolve(&self, request: impl Into<LibraryRequest>) -> Result<Vec<String>, LazyError> {
        match request.into() {
            LibraryRequest::One(name) => self.resolve_name(&name),
            LibraryRequest::Many(names) => {
                let mut libraries = Vec::new();
                for name in &names {
                    libraries.extend(self.resolve_name(name)?);
                }
                Ok(libraries)
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Vec<String>, LazyError> {
        if let Some(members) = self.bundles.get(name) {
            let any_known = members
                .iter()
                .any(|m| self.is_library(m) || self.is_bundle(m));
            if !any_known {
                return Err(LazyError::InvalidLibraryOrBundleName(name.to_string()));
            }
            return Ok(members.clone());
        }

        if self.is_library(name) {
            Ok(vec![name.to_string()])
        } else {
            Err(LazyError::InvalidLibraryOrBundleName(name.to_string()))
        }
    }
}

impl fmt::Debug for LazyCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut libraries: Vec<&String> = self.loadables.keys().collect();
        libraries.sort();
        f.debug_struct("LazyCatalog")
            .field("libraries", &libraries)
            .field("bundles", &self.bundles)
            .finish()
    }
}
