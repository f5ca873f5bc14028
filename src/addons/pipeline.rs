//! In-process form of the generated `load` function.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

/// A configuration transform. Returning `None` means "no config returned".
pub type TransformFn<C> = Arc<dyn Fn(C) -> Option<C> + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    #[error(
        "each addon has to provide a function applying its configuration to the project configuration, \
         but `{identifier}` is not callable"
    )]
    NonCallablePipelineEntry { identifier: String },

    #[error("configuration function `{identifier}` doesn't return config")]
    UndefinedTransformResult { identifier: String },
}

/// What an addon exports under a given name.
pub enum AddonExport<C> {
    Transform(TransformFn<C>),
    /// Anything that is not a function, e.g. a constant or a component.
    Value(String),
}

impl<C> AddonExport<C> {
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(C) -> Option<C> + Send + Sync + 'static,
    {
        AddonExport::Transform(Arc::new(f))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, AddonExport::Transform(_))
    }
}

impl<C> Clone for AddonExport<C> {
    fn clone(&self) -> Self {
        match self {
            AddonExport::Transform(f) => AddonExport::Transform(Arc::clone(f)),
            AddonExport::Value(v) => AddonExport::Value(v.clone()),
        }
    }
}

impl<C> fmt::Debug for AddonExport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonExport::Transform(_) => f.write_str("Transform(..)"),
            AddonExport::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

/// Ordered configuration transforms, applied strictly left to right.
pub struct CompositionPipeline<C> {
    entries: Vec<(String, AddonExport<C>)>,
}

impl<C> CompositionPipeline<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, identifier: impl Into<String>, export: AddonExport<C>) -> &mut Self {
        self.entries.push((identifier.into(), export));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(ident, _)| ident.as_str())
    }

    /// Folds every transform over `config`.
    ///
    /// All entries are checked for callability before the first transform
    /// runs. A transform returning `None` stops the fold; the partially
    /// built configuration is dropped.
    pub fn load(&self, config: C) -> Result<C, PipelineError> {
        let mut transforms = Vec::with_capacity(self.entries.len());
        for (identifier, export) in &self.entries {
            match export {
                AddonExport::Transform(f) => transforms.push((identifier, f)),
                AddonExport::Value(_) => {
                    return Err(PipelineError::NonCallablePipelineEntry {
                        identifier: identifier.clone(),
                    })
                }
            }
        }

        debug!(transforms = transforms.len(), "applying addon configuration");
        transforms
            .into_iter()
            .try_fold(config, |acc, (identifier, apply)| {
                trace!(%identifier, "applying transform");
                (**apply)(acc).ok_or_else(|| PipelineError::UndefinedTransformResult {
                    identifier: identifier.clone(),
                })
            })
    }
}

impl<C> Default for CompositionPipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CompositionPipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionPipeline")
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn set_key(key: &'static str, n: i64) -> AddonExport<Value> {
        AddonExport::transform(move |mut config: Value| {
            config[key] = json!(n);
            Some(config)
        })
    }

    #[test]
    fn test_every_addon_contributes_its_key() {
        let mut pipeline = CompositionPipeline::new();
        let keys = ["k0", "k1", "k2", "k3"];
        for (i, key) in keys.iter().enumerate() {
            pipeline.push(*key, set_key(*key, i as i64));
        }

        let config = pipeline.load(json!({})).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(config[*key], json!(i));
        }
    }

    #[test]
    fn test_order_matters() {
        let base = AddonExport::transform(|mut c: Value| {
            c["base"] = json!(10);
            Some(c)
        });
        let dependent = AddonExport::transform(|mut c: Value| {
            let base = c.get("base")?.as_i64()?;
            c["derived"] = json!(base * 2);
            Some(c)
        });

        let mut in_order = CompositionPipeline::new();
        in_order.push("base", base.clone()).push("dependent", dependent.clone());
        assert_eq!(in_order.load(json!({})).unwrap()["derived"], json!(20));

        let mut swapped = CompositionPipeline::new();
        swapped.push("dependent", dependent).push("base", base);
        assert_eq!(
            swapped.load(json!({})),
            Err(PipelineError::UndefinedTransformResult {
                identifier: "dependent".into()
            })
        );
    }

    #[test]
    fn test_undefined_result_stops_the_fold() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            AddonExport::transform(move |c: Value| {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(c)
            })
        };

        let mut pipeline = CompositionPipeline::new();
        pipeline
            .push("first", counted.clone())
            .push("broken", AddonExport::transform(|_: Value| None))
            .push("never", counted);

        let err = pipeline.load(json!({})).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UndefinedTransformResult {
                identifier: "broken".into()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("doesn't return config"));
    }

    #[test]
    fn test_non_callable_rejected_before_any_transform() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            AddonExport::transform(move |c: Value| {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(c)
            })
        };

        let mut pipeline = CompositionPipeline::new();
        pipeline
            .push("ok", counted)
            .push("settings0", AddonExport::Value("{}".into()));

        assert_eq!(
            pipeline.load(json!({})),
            Err(PipelineError::NonCallablePipelineEntry {
                identifier: "settings0".into()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = CompositionPipeline::<Value>::new();
        assert_eq!(pipeline.load(json!({"a": 1})).unwrap(), json!({"a": 1}));
    }
}
