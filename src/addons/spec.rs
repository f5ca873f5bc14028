use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::identifier::is_valid_identifier;
use super::AddonError;

/// One parsed addon reference: `packageId[:extraExport1,extraExport2,...]`.
///
/// Nothing here checks that the package or its exports exist; that is the
/// loader's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonSpec {
    package_id: String,
    extra_exports: Vec<String>,
}

impl AddonSpec {
    pub fn parse(spec: &str) -> Result<Self, AddonError> {
        let mut segments = spec.split(':');
        let package_id = segments.next().unwrap_or_default().trim();
        if package_id.is_empty() {
            return Err(AddonError::EmptyPackageId(spec.to_string()));
        }

        let extra_exports = match segments.next() {
            Some(list) => parse_exports(spec, list)?,
            None => Vec::new(),
        };

        if segments.next().is_some() {
            debug!(spec, "ignoring segments after the export list");
        }

        Ok(Self {
            package_id: package_id.to_string(),
            extra_exports,
        })
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Named exports requested besides the default one, in spec order.
    pub fn extra_exports(&self) -> &[String] {
        &self.extra_exports
    }
}

fn parse_exports(spec: &str, list: &str) -> Result<Vec<String>, AddonError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            if is_valid_identifier(name) {
                Ok(name.to_string())
            } else {
                Err(AddonError::InvalidExportName {
                    spec: spec.to_string(),
                    name: name.to_string(),
                })
            }
        })
        .collect()
}

impl FromStr for AddonSpec {
    type Err = AddonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AddonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package_id)?;
        if !self.extra_exports.is_empty() {
            write!(f, ":{}", self.extra_exports.join(","))?;
        }
        Ok(())
    }
}
