//! Source generation for the addon loader module.
//!
//! The generated text is an ES module: one import per addon followed by a
//! `load(config)` default export that folds every imported configuration
//! function over the initial configuration, in spec order.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use super::identifier::{export_identifier, synthesize_with};
use super::spec::AddonSpec;
use super::AddonError;

const HEADER: &str = "\
/*
This file is autogenerated. Don't change it directly.
Instead, change the \"addons\" setting in your host configuration.
*/

";

const LOADERS_MARKER: &str = "__ADDON_LOADERS__";

const RUNTIME: &str = r#"
const safeWrapper = (func) => (config) => {
  const res = func(config);
  if (typeof res === 'undefined') {
    throw new Error("Configuration function doesn't return config");
  }
  return res;
};

const load = (config) => {
  const addonLoaders = [__ADDON_LOADERS__];
  if (!addonLoaders.every((el) => typeof el === 'function')) {
    throw new TypeError(
      'Each addon has to provide a function applying its configuration to the projects configuration.',
    );
  }
  return addonLoaders.reduce((acc, apply) => safeWrapper(apply)(acc), config);
};
export default load;
"#;

/// An extra export and the identifier it is imported as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBinding {
    pub export: String,
    pub ident: String,
}

/// Everything one addon contributes to the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonImport {
    pub package_id: String,
    pub default_ident: String,
    pub extras: Vec<ExportBinding>,
}

impl AddonImport {
    fn render(&self) -> String {
        let mut line = format!("import {}", self.default_ident);
        if !self.extras.is_empty() {
            let bindings: Vec<String> = self
                .extras
                .iter()
                .map(|b| format!("{} as {}", b.export, b.ident))
                .collect();
            line.push_str(&format!(", {{ {} }}", bindings.join(", ")));
        }
        line.push_str(&format!(" from {};\n", quote(&self.package_id)));
        line
    }

    /// Identifiers in pipeline order: the default export, then the extras.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default_ident.as_str())
            .chain(self.extras.iter().map(|b| b.ident.as_str()))
    }
}

/// A generated loader module. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    source: String,
    imports: Vec<AddonImport>,
}

impl GeneratedModule {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn imports(&self) -> &[AddonImport] {
        &self.imports
    }

    /// All identifiers taking part in the pipeline, in application order.
    pub fn pipeline_identifiers(&self) -> Vec<&str> {
        self.imports.iter().flat_map(AddonImport::identifiers).collect()
    }
}

/// Generates the loader module for `specs`, in order.
///
/// Fails on the first malformed spec; no partial module is returned.
pub fn generate<I, S>(specs: I) -> Result<GeneratedModule, AddonError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    generate_with(specs, &mut rand::thread_rng())
}

/// [`generate`] with a caller-supplied RNG for identifier fallbacks.
pub fn generate_with<I, S, R>(specs: I, rng: &mut R) -> Result<GeneratedModule, AddonError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng,
{
    let mut counter = 0;
    let mut taken = HashSet::new();
    let mut imports = Vec::new();

    for spec in specs {
        let spec = AddonSpec::parse(spec.as_ref())?;
        let default_ident = claim(
            synthesize_with(spec.package_id(), rng),
            &mut taken,
            &mut counter,
        );
        let extras = spec
            .extra_exports()
            .iter()
            .map(|export| {
                let ident = export_identifier(export, counter);
                counter += 1;
                ExportBinding {
                    export: export.clone(),
                    ident: claim(ident, &mut taken, &mut counter),
                }
            })
            .collect();

        let import = AddonImport {
            package_id: spec.package_id().to_string(),
            default_ident,
            extras,
        };
        debug!(package = %import.package_id, ident = %import.default_ident, "planned addon import");
        imports.push(import);
    }

    let mut source = String::from(HEADER);
    for import in &imports {
        source.push_str(&import.render());
    }

    let loaders: Vec<&str> = imports.iter().flat_map(AddonImport::identifiers).collect();
    source.push_str(&RUNTIME.replace(LOADERS_MARKER, &loaders.join(", ")));

    info!(addons = imports.len(), transforms = loaders.len(), "generated addon loader");
    Ok(GeneratedModule { source, imports })
}

// Identifiers share one module scope. A taken one gets the running counter
// appended until it is free.
fn claim(ident: String, taken: &mut HashSet<String>, counter: &mut usize) -> String {
    if taken.insert(ident.clone()) {
        return ident;
    }
    loop {
        let candidate = format!("{ident}{counter}");
        *counter += 1;
        if taken.insert(candidate.clone()) {
            debug!(%ident, %candidate, "renamed colliding identifier");
            return candidate;
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if matches!(c, '\'' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn import_lines(module: &GeneratedModule) -> Vec<&str> {
        module
            .source()
            .lines()
            .filter(|l| l.starts_with("import "))
            .collect()
    }

    #[test]
    fn test_import_lines_follow_input_order() {
        let module = generate([
            "volto-tabs",
            "@plone/volto-slate:asDefault,minimal",
            "volto-form:extend",
        ])
        .unwrap();

        assert_eq!(
            import_lines(&module),
            vec![
                "import voltoTabs from 'volto-tabs';",
                "import plonevoltoSlate, { asDefault as asDefault0, minimal as minimal1 } from '@plone/volto-slate';",
                "import voltoForm, { extend as extend2 } from 'volto-form';",
            ]
        );
    }

    #[test]
    fn test_pipeline_order_and_array() {
        let module = generate(["a-pkg:x,y", "b-pkg"]).unwrap();
        assert_eq!(module.pipeline_identifiers(), ["aPkg", "x0", "y1", "bPkg"]);
        assert!(module
            .source()
            .contains("const addonLoaders = [aPkg, x0, y1, bPkg];"));
    }

    #[test]
    fn test_counter_keeps_repeated_exports_unique() {
        let module = generate(["one:asDefault", "two:asDefault"]).unwrap();
        let idents = module.pipeline_identifiers();
        assert_eq!(idents, ["one", "asDefault0", "two", "asDefault1"]);

        let mut deduped = idents.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), idents.len());
    }

    fn assert_unique(idents: &[&str]) {
        let distinct: HashSet<&str> = idents.iter().copied().collect();
        assert_eq!(distinct.len(), idents.len(), "duplicate identifier in {idents:?}");
    }

    #[test]
    fn test_packages_stripping_to_the_same_name() {
        let module = generate(["@foo/bar", "foo.bar"]).unwrap();
        assert_eq!(module.pipeline_identifiers(), ["foobar", "foobar0"]);
        assert_eq!(
            import_lines(&module),
            vec![
                "import foobar from '@foo/bar';",
                "import foobar0 from 'foo.bar';",
            ]
        );
    }

    #[test]
    fn test_default_colliding_with_extra_export() {
        let module = generate(["pkg:x", "x0"]).unwrap();
        let idents = module.pipeline_identifiers();
        assert_eq!(idents, ["pkg", "x0", "x01"]);
        assert_unique(&idents);

        let module = generate(["x0", "pkg:x"]).unwrap();
        let idents = module.pipeline_identifiers();
        assert_eq!(idents, ["x0", "pkg", "x01"]);
        assert_unique(&idents);
        assert!(module
            .source()
            .contains("import pkg, { x as x01 } from 'pkg';"));
    }

    #[test]
    fn test_reserved_package_names() {
        let module = generate(["new", "class:default"]).unwrap();
        assert_eq!(module.pipeline_identifiers(), ["_new", "_class", "default0"]);
        assert!(module.source().contains("import _new from 'new';"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let specs = ["@scope/pkg:a,b", "@", "other"];
        let first = generate_with(specs, &mut StdRng::seed_from_u64(3)).unwrap();
        let second = generate_with(specs, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first.source(), second.source());
    }

    #[test]
    fn test_empty_list_still_exports_load() {
        let module = generate(Vec::<String>::new()).unwrap();
        assert!(import_lines(&module).is_empty());
        assert!(module.source().contains("const addonLoaders = [];"));
        assert!(module.source().trim_end().ends_with("export default load;"));
    }

    #[test]
    fn test_runtime_contract_is_emitted() {
        let module = generate(["pkg"]).unwrap();
        assert!(module.source().starts_with("/*\nThis file is autogenerated."));
        assert!(module.source().contains("doesn't return config"));
        assert!(module.source().contains("throw new TypeError("));
        assert!(!module.source().contains(LOADERS_MARKER));
    }

    #[test]
    fn test_malformed_spec_aborts() {
        let result = generate(["good", ":bad"]);
        assert!(matches!(result, Err(AddonError::EmptyPackageId(_))));
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(quote("it's"), r"'it\'s'");
    }
}
