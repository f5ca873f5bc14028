use crate::addons::{AddonError, PipelineError};
use crate::lazy::LazyError;
use crate::settings::SettingsError;
use thiserror::Error;

/// Top-level error type for the dragon-addons library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("addon error: {0}")]
    Addon(#[from] AddonError),

    #[error("addon pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("lazy library error: {0}")]
    Lazy(#[from] LazyError),

    #[error("application context requires a configuration")]
    MissingConfig,
}
