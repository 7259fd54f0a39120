//! Remote configuration document model.
//!
//! The document is what the asset host publishes: a timestamp and a list of
//! named files, each with per-app-version download variants.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Selector matching any app version without an exact entry.
pub const WILDCARD_VERSION: &str = "*";

/// The full remote configuration payload for one point in time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Publication timestamp; newer documents have larger values.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_updated_at: u64,

    /// Files in publication order.
    pub files: Vec<ConfigFile>,
}

/// One named, typed asset with app-version-scoped variants.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Unique within a document.
    pub name: String,

    /// Asset kind, e.g. "json" or "image".
    #[serde(rename = "type")]
    pub kind: String,

    /// Variants keyed by app version or [`WILDCARD_VERSION`].
    pub versions: BTreeMap<String, ConfigFileVersion>,

    /// Fields not interpreted by the server, kept as published.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One concrete downloadable variant of a file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigFileVersion {
    pub location: Location,

    /// Byte length read from the asset host; never taken from the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// Copy of the owning file's kind, set on lookup results only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub url: String,
}

/// Lookup result: file name to the variant an app version should download.
pub type ResolvedFiles = BTreeMap<String, ConfigFileVersion>;

/// Read a timestamp the way JSON Schema's `integer` type does: `2.0` is an
/// integer, `2.5` and negatives are not.
pub fn timestamp_of(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    timestamp_of(&value).ok_or_else(|| {
        de::Error::custom(format!("invalid timestamp {}, expected a non-negative integer", value))
    })
}

impl ConfigDocument {
    /// Decode a JSON value, dropping any `size` or `type` the source put on
    /// versions since both are owned by the server.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut document: ConfigDocument = serde_json::from_value(value)?;
        for file in &mut document.files {
            for version in file.versions.values_mut() {
                version.size = None;
                version.kind = None;
            }
        }
        Ok(document)
    }

    /// Variants for `app_version`: an exact selector match wins, then the
    /// wildcard. Files matching neither are left out.
    pub fn resolve(&self, app_version: &str) -> ResolvedFiles {
        let mut resolved = ResolvedFiles::new();

        for file in &self.files {
            let chosen = file
                .versions
                .get(app_version)
                .or_else(|| file.versions.get(WILDCARD_VERSION));

            if let Some(version) = chosen {
                let mut version = version.clone();
                version.kind = Some(file.kind.clone());
                resolved.insert(file.name.clone(), version);
            }
        }

        resolved
    }

    /// Number of `(file, selector)` pairs, i.e. size lookups a refresh makes.
    pub fn variant_count(&self) -> usize {
        self.files.iter().map(|f| f.versions.len()).sum()
    }
}
