use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::codegen::GeneratedModule;
use super::pipeline::{AddonExport, CompositionPipeline};
use super::AddonError;

/// Turns a generated module into something that can run it.
///
/// Implementations may hand the source text to an external runtime or, like
/// [`AddonCatalog`], link the module's import plan against exports that are
/// already in process.
pub trait ModuleLoader<C> {
    fn load_module(&self, module: &GeneratedModule) -> Result<CompositionPipeline<C>, AddonError>;
}

struct Package<C> {
    default: AddonExport<C>,
    named: HashMap<String, AddonExport<C>>,
}

/// Addon packages available in process, keyed by package id.
pub struct AddonCatalog<C> {
    packages: HashMap<String, Package<C>>,
}

impl<C> AddonCatalog<C> {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
        }
    }

    /// Registers a package's default export, replacing any previous one.
    pub fn register(&mut self, package_id: impl Into<String>, default: AddonExport<C>) -> &mut Self {
        let package_id = package_id.into();
        match self.packages.get_mut(&package_id) {
            Some(package) => package.default = default,
            None => {
                self.packages.insert(
                    package_id,
                    Package {
                        default,
                        named: HashMap::new(),
                    },
                );
            }
        }
        self
    }

    /// Registers a named export on a package registered earlier.
    pub fn register_export(
        &mut self,
        package_id: &str,
        name: impl Into<String>,
        export: AddonExport<C>,
    ) -> Result<&mut Self, AddonError> {
        let package = self
            .packages
            .get_mut(package_id)
            .ok_or_else(|| AddonError::UnknownPackage(package_id.to_string()))?;
        package.named.insert(name.into(), export);
        Ok(self)
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.packages.contains_key(package_id)
    }
}

impl<C> ModuleLoader<C> for AddonCatalog<C> {
    fn load_module(&self, module: &GeneratedModule) -> Result<CompositionPipeline<C>, AddonError> {
        let mut pipeline = CompositionPipeline::new();

        for import in module.imports() {
            let package = self
                .packages
                .get(&import.package_id)
                .ok_or_else(|| AddonError::UnknownPackage(import.package_id.clone()))?;

            pipeline.push(import.default_ident.clone(), package.default.clone());
            for binding in &import.extras {
                let export = package.named.get(&binding.export).ok_or_else(|| {
                    AddonError::UnknownExport {
                        package: import.package_id.clone(),
                        export: binding.export.clone(),
                    }
                })?;
                pipeline.push(binding.ident.clone(), export.clone());
            }
        }

        debug!(transforms = pipeline.len(), "linked addon module");
        Ok(pipeline)
    }
}

impl<C> Default for AddonCatalog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for AddonCatalog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut packages: Vec<&String> = self.packages.keys().collect();
        packages.sort();
        f.debug_struct("AddonCatalog").field("packages", &packages).finish()
    }
}
