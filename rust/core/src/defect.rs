// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defect log
//!
//! Session-only annotations dropped on the model surface. A record is created
//! by a long press, filled in through an edit form, and discarded again only
//! when the form is cancelled while the record is still blank.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};

/// Defect type preselected in a fresh edit form
pub const DEFAULT_DEFECT_TYPE: &str = "Structural";
/// Criticality preselected in a fresh edit form
pub const DEFAULT_CRITICALITY: &str = "Low";

/// Characters of the description shown in the log list
const EXCERPT_LEN: usize = 50;

/// Where a defect sits on the model
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// World-space hit point
    pub point: Point3<f64>,
    /// World-space surface normal at the hit
    pub normal: Vector3<f64>,
    /// Child-index path from the model root to the hit mesh node
    pub node_path: Vec<usize>,
}

/// One annotated defect
#[derive(Debug, Clone, PartialEq)]
pub struct DefectRecord {
    /// Creation timestamp in ms, unique within the log
    pub id: u64,
    pub attachment: Attachment,
    /// GlobalId of the BIM element the defect was dropped on
    pub global_id: Option<String>,
    pub description: String,
    pub defect_type: String,
    pub criticality: String,
    /// Photo as a data URL
    pub photo: Option<String>,
}

impl DefectRecord {
    /// A record with no description and no photo is still disposable
    pub fn is_blank(&self) -> bool {
        self.description.is_empty() && self.photo.is_none()
    }

    /// Values to prefill the edit form with
    pub fn form(&self) -> DefectEdit {
        DefectEdit {
            description: self.description.clone(),
            defect_type: non_empty_or(&self.defect_type, DEFAULT_DEFECT_TYPE),
            criticality: non_empty_or(&self.criticality, DEFAULT_CRITICALITY),
            photo: self.photo.clone(),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Submitted edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefectEdit {
    pub description: String,
    pub defect_type: String,
    pub criticality: String,
    pub photo: Option<String>,
}

/// A line of the defect log list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectSummary {
    pub id: u64,
    /// `"{type} ({criticality})"`
    pub label: String,
    /// Truncated description
    pub excerpt: String,
    pub photo: Option<String>,
}

/// Ordered list of the session's defects
#[derive(Debug, Clone, Default)]
pub struct DefectLog {
    records: Vec<DefectRecord>,
    last_id: u64,
}

impl DefectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank record and return its id.
    ///
    /// The id is the creation time in ms, bumped when two defects land in the
    /// same millisecond (or the clock steps backwards).
    pub fn create(&mut self, attachment: Attachment, global_id: Option<String>, now_ms: u64) -> u64 {
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        self.records.push(DefectRecord {
            id,
            attachment,
            global_id,
            description: String::new(),
            defect_type: String::new(),
            criticality: String::new(),
            photo: None,
        });
        tracing::debug!(id, "Defect created");
        id
    }

    pub fn get(&self, id: u64) -> Option<&DefectRecord> {
        self.records.iter().find(|d| d.id == id)
    }

    /// Apply a submitted form. An empty photo string counts as no photo.
    pub fn save(&mut self, id: u64, edit: DefectEdit) -> Result<&DefectRecord> {
        let record = self
            .records
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DefectNotFound(id))?;

        record.description = edit.description;
        record.defect_type = edit.defect_type;
        record.criticality = edit.criticality;
        record.photo = edit.photo.filter(|p| !p.is_empty());

        tracing::info!(id, has_photo = record.photo.is_some(), "Defect saved");
        Ok(record)
    }

    /// Close the form without saving. Blank records are removed; returns
    /// whether the record was dropped.
    pub fn cancel(&mut self, id: u64) -> Result<bool> {
        let index = self
            .records
            .iter()
            .position(|d| d.id == id)
            .ok_or(Error::DefectNotFound(id))?;

        if self.records[index].is_blank() {
            self.records.remove(index);
            tracing::debug!(id, "Blank defect discarded");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DefectRecord> {
        self.records.iter()
    }

    /// Remove everything (model reload)
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// List lines for the log view, in creation order
    pub fn summaries(&self) -> Vec<DefectSummary> {
        self.records
            .iter()
            .map(|d| {
                let defect_type = non_empty_or(&d.defect_type, "Type not specified");
                let criticality = non_empty_or(&d.criticality, "Criticality not specified");
                let description = non_empty_or(&d.description, "No description");
                let excerpt: String = description.chars().take(EXCERPT_LEN).collect();
                DefectSummary {
                    id: d.id,
                    label: format!("{defect_type} ({criticality})"),
                    excerpt: format!("{excerpt}..."),
                    photo: d.photo.clone(),
                }
            })
            .collect()
    }
}
