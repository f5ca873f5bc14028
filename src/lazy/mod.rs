//! Deferred loading of optional libraries.
//!
//! A [`LazyCatalog`] names the libraries that can be loaded and the bundles
//! that group them, a [`LazyRegistry`] loads each one at most once and
//! caches the result, and the gates in this module hold consumers back
//! until what they need has arrived.

mod catalog;
mod error;
mod gate;
mod loadable;
mod registry;

pub use catalog::{LazyCatalog, LibraryRequest};
pub use error::LazyError;
pub use gate::{InjectGate, LoadedLibraries, PreloadGate};
pub use loadable::{BoxError, LibraryValue, LoadFn, Loadable};
pub use registry::{LazyRegistry, RegistryState};
