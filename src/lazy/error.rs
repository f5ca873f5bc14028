use thiserror::Error;

use super::loadable::BoxError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LazyError {
    #[error("invalid lib or bundle name {0}")]
    InvalidLibraryOrBundleName(String),

    #[error("lazy library '{name}' failed to load: {source}")]
    LoaderRejection {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("cannot load '{0}' outside of a tokio runtime")]
    NoRuntime(String),

    #[error("library registry was dropped while waiting for libraries")]
    RegistryClosed,
}
