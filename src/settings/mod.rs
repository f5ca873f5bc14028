//! Layered host settings: the addon list, lazy bundles and loader output options.

mod addon;
mod builder;
mod env;
mod error;
mod file;
mod source;

pub use addon::{AddonSettings, BundleMembers, LoaderSettings};
pub use builder::Settings;
pub use env::EnvSource;
pub use error::SettingsError;
pub use file::FileSource;
pub use source::{InlineSource, SettingsEntry, SettingsSource};
