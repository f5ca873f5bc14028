use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Host settings consumed by the addon generator and the lazy library catalog.
///
/// ```toml
/// addons = ["@plone/volto-slate:asDefault,minimal", "volto-tabs"]
///
/// [lazy_bundles]
/// editor = ["prettier", "diff"]
/// charts = "d3"
///
/// [loader]
/// suffix = ".js"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddonSettings {
    /// Addon spec strings, applied in this order.
    pub addons: Vec<String>,
    pub lazy_bundles: BTreeMap<String, BundleMembers>,
    pub loader: LoaderSettings,
}

/// A bundle may name a single library or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BundleMembers {
    One(String),
    Many(Vec<String>),
}

impl BundleMembers {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            BundleMembers::One(name) => vec![name],
            BundleMembers::Many(names) => names,
        }
    }
}

/// Where generated loader modules are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub suffix: String,
    /// Defaults to the system temp directory.
    pub dir: Option<PathBuf>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            suffix: ".js".to_string(),
            dir: None,
        }
    }
}
