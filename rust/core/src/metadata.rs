// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM metadata keyed by IFC GlobalId
//!
//! The metadata file is a JSON object mapping each GlobalId to a record with
//! an optional `Name`, an optional `IfcType` and a free-form `Properties`
//! object. Property values are either scalars or objects carrying a `value`
//! field (property single values exported with their unit/type).
//! `Name` and `IfcType` are kept as raw JSON and rendered as text, so an
//! exporter writing a number there does not hide the record. Properties keep
//! the order they have in the file.

use crate::error::Result;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Title used when an element record has no `Name`
const DEFAULT_TITLE: &str = "Element information";

/// One element's metadata record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementRecord {
    #[serde(rename = "Name")]
    pub name: Option<Value>,
    #[serde(rename = "IfcType")]
    pub ifc_type: Option<Value>,
    #[serde(rename = "Properties")]
    pub properties: Map<String, Value>,
}

impl ElementRecord {
    /// `Name` as text; `None` when absent, null or empty
    pub fn name_text(&self) -> Option<String> {
        text_field(self.name.as_ref())
    }

    /// `IfcType` as text; `None` when absent, null or empty
    pub fn ifc_type_text(&self) -> Option<String> {
        text_field(self.ifc_type.as_ref())
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        value => Some(display_value(value)).filter(|text| !text.is_empty()),
    }
}

/// A key/value row ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub key: String,
    pub value: String,
}

impl InfoRow {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Displayable summary of an element (or of a failed lookup)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Whether a record exists for the requested id
    pub found: bool,
    pub title: String,
    pub rows: Vec<InfoRow>,
}

/// All element records of a loaded model
#[derive(Debug, Clone, Default)]
pub struct BimMetadata {
    elements: FxHashMap<String, ElementRecord>,
}

impl BimMetadata {
    /// Parse the metadata JSON.
    ///
    /// The top level must be an object; entries whose value is not an object
    /// record are skipped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let root: Map<String, Value> = serde_json::from_slice(bytes)?;
        let mut elements = FxHashMap::default();
        elements.reserve(root.len());

        for (global_id, value) in root {
            match serde_json::from_value::<ElementRecord>(value) {
                Ok(record) => {
                    elements.insert(global_id, record);
                }
                Err(err) => {
                    tracing::debug!(%global_id, error = %err, "Skipping malformed element record");
                }
            }
        }

        Ok(Self { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, global_id: &str) -> Option<&ElementRecord> {
        self.elements.get(global_id)
    }

    /// Build the info panel content for an element
    pub fn element_info(&self, global_id: &str) -> ElementInfo {
        let Some(record) = self.get(global_id) else {
            return ElementInfo {
                found: false,
                title: "Error".to_string(),
                rows: vec![InfoRow::new(
                    "",
                    format!("No information found for element with ID {global_id}."),
                )],
            };
        };

        let mut rows = Vec::with_capacity(record.properties.len() + 2);
        rows.push(InfoRow::new("ID", global_id));
        rows.push(InfoRow::new(
            "Type",
            record.ifc_type_text().unwrap_or_else(|| "N/A".to_string()),
        ));
        for (key, value) in &record.properties {
            rows.push(InfoRow::new(key.as_str(), display_value(value)));
        }

        ElementInfo {
            found: true,
            title: record
                .name_text()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            rows,
        }
    }
}

/// Render a property value as text.
///
/// `{"value": X, ...}` shows X, any other object or array is shown as JSON,
/// strings are shown without quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("value") {
            Some(inner) => display_value(inner),
            None => value.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
