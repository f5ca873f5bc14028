pub mod addons;
pub mod context;
mod error;
pub mod lazy;
pub mod settings;

pub use addons::{generate, write_loader, AddonCatalog, AddonError, GeneratedModule, ModuleLoader};
pub use context::AppContext;
pub use error::Error;
pub use settings::{AddonSettings, Settings, SettingsError};
