use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AddonError {
    #[error("addon spec '{0}' has an empty package id")]
    EmptyPackageId(String),

    #[error("addon spec '{spec}' requests '{name}', which is not a valid export name")]
    InvalidExportName { spec: String, name: String },

    #[error("addon package not found: {0}")]
    UnknownPackage(String),

    #[error("addon package '{package}' has no export named '{export}'")]
    UnknownExport { package: String, export: String },

    #[error("failed to write addon loader into '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
