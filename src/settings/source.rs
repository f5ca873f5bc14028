use toml::{Table, Value};

use super::SettingsError;

/// A value contributed by a source, anchored at a dotted path.
///
/// An empty path means the value is a table merged at the root.
#[derive(Debug, Clone)]
pub struct SettingsEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl SettingsEntry {
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// Anything that can contribute entries to the merged settings table.
pub trait SettingsSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError>;
}

/// Settings given as a TOML string, mostly useful for embedding defaults.
#[derive(Debug, Clone)]
pub struct InlineSource {
    contents: String,
}

impl InlineSource {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }
}

impl SettingsSource for InlineSource {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError> {
        let table: Table =
            toml::from_str(&self.contents).map_err(SettingsError::InlineParseError)?;
        Ok(vec![SettingsEntry::root(table)])
    }
}

pub(crate) fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

/// Nested tables merge recursively; everything else, arrays included, is replaced.
fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(s: &str) -> Table {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_root_merge_replaces_arrays() {
        let mut base = table(r#"addons = ["a", "b"]"#);
        merge_at_path(&mut base, &[], Value::Table(table(r#"addons = ["c"]"#)));

        let addons = base["addons"].as_array().unwrap();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].as_str(), Some("c"));
    }

    #[test]
    fn test_nested_path_creates_tables() {
        let mut base = Table::new();
        merge_at_path(
            &mut base,
            &["loader".to_string(), "suffix".to_string()],
            Value::String(".mjs".into()),
        );
        assert_eq!(base["loader"]["suffix"].as_str(), Some(".mjs"));
    }

    #[test]
    fn test_nested_tables_merge_recursively() {
        let mut base = table(
            r#"
            [lazy_bundles]
            editor = ["prettier"]
            "#,
        );
        merge_at_path(
            &mut base,
            &["lazy_bundles".to_string()],
            Value::Table(table(r#"charts = ["d3"]"#)),
        );
        assert!(base["lazy_bundles"].get("editor").is_some());
        assert!(base["lazy_bundles"].get("charts").is_some());
    }

    #[test]
    fn test_inline_source_rejects_bad_toml() {
        let result = InlineSource::new("addons = [").entries();
        assert!(matches!(result, Err(SettingsError::InlineParseError(_))));
    }
}
