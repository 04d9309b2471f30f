// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain-object shapes returned to JavaScript

use ifc_ar_core::{DefectRecord, DefectSummary, ElementInfo};
use ifc_ar_engine::{Appearance, DefectMarker, SelectionChange, ViewerEvent};
use ifc_ar_placement::{ConfirmOutcome, SourceTicket};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct InfoRowJs {
    pub key: String,
    pub value: String,
}

#[derive(Serialize)]
pub struct ElementInfoJs {
    pub title: String,
    pub rows: Vec<InfoRowJs>,
}

impl From<ElementInfo> for ElementInfoJs {
    fn from(info: ElementInfo) -> Self {
        Self {
            title: info.title,
            rows: info
                .rows
                .into_iter()
                .map(|row| InfoRowJs {
                    key: row.key,
                    value: row.value,
                })
                .collect(),
        }
    }
}

/// Edit form contents, both directions
#[derive(Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DefectFormJs {
    pub description: String,
    #[serde(rename = "type")]
    pub defect_type: String,
    pub criticality: String,
    pub photo: Option<String>,
}

impl From<DefectFormJs> for ifc_ar_core::DefectEdit {
    fn from(form: DefectFormJs) -> Self {
        Self {
            description: form.description,
            defect_type: form.defect_type,
            criticality: form.criticality,
            photo: form.photo,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectOpenedJs {
    pub id: f64,
    pub global_id: Option<String>,
    /// Marker position in world space
    pub position: [f64; 3],
    pub marker_radius: f64,
    pub form: DefectFormJs,
}

impl DefectOpenedJs {
    pub fn new(record: &DefectRecord, marker: DefectMarker) -> Self {
        let form = record.form();
        let p = marker.center;
        Self {
            id: record.id as f64,
            global_id: record.global_id.clone(),
            position: [p.x, p.y, p.z],
            marker_radius: marker.radius,
            form: DefectFormJs {
                description: form.description,
                defect_type: form.defect_type,
                criticality: form.criticality,
                photo: form.photo,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectSummaryJs {
    pub id: f64,
    pub label: String,
    pub excerpt: String,
    pub photo: Option<String>,
    pub position: [f64; 3],
    pub marker_radius: f64,
}

impl DefectSummaryJs {
    pub fn new(summary: DefectSummary, marker: Option<DefectMarker>) -> Self {
        let (position, marker_radius) = marker
            .map(|m| ([m.center.x, m.center.y, m.center.z], m.radius))
            .unwrap_or_default();
        Self {
            id: summary.id as f64,
            label: summary.label,
            excerpt: summary.excerpt,
            photo: summary.photo,
            position,
            marker_radius,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventJs {
    #[serde(rename_all = "camelCase")]
    Placement { outcome: &'static str, status: &'static str },
    #[serde(rename_all = "camelCase")]
    Selection {
        selected: Option<String>,
        info: Option<ElementInfoJs>,
    },
    #[serde(rename_all = "camelCase")]
    DefectOpened { defect: Option<DefectOpenedJs> },
}

fn outcome_name(outcome: &ConfirmOutcome) -> &'static str {
    match outcome {
        ConfirmOutcome::Placed => "placed",
        ConfirmOutcome::FloorCaptured => "floorCaptured",
        ConfirmOutcome::Aligned { degenerate: false } => "aligned",
        ConfirmOutcome::Aligned { degenerate: true } => "alignedKeptHeading",
        ConfirmOutcome::Refused(_) => "refused",
        ConfirmOutcome::Ignored => "ignored",
    }
}

impl EventJs {
    pub fn placement(outcome: ConfirmOutcome) -> Self {
        EventJs::Placement {
            outcome: outcome_name(&outcome),
            status: outcome.status(),
        }
    }

    /// `lookup` resolves a defect id to its record and marker
    pub fn from_event<'a>(
        event: ViewerEvent,
        lookup: impl Fn(u64) -> Option<(&'a DefectRecord, DefectMarker)>,
    ) -> Self {
        match event {
            ViewerEvent::Placement(outcome) => Self::placement(outcome),
            ViewerEvent::Selection { change, info } => EventJs::Selection {
                selected: match change {
                    SelectionChange::Selected(id) => Some(id),
                    SelectionChange::Deselected | SelectionChange::Unchanged => None,
                },
                info: info.map(ElementInfoJs::from),
            },
            ViewerEvent::DefectOpened(id) => EventJs::DefectOpened {
                defect: lookup(id).map(|(record, marker)| DefectOpenedJs::new(record, marker)),
            },
        }
    }
}

/// Result of one `onFrame` call
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResultJs {
    /// Ticket to negotiate a viewer-space hit-test source for, if requested
    /// this frame
    pub request_hit_test_source: Option<f64>,
    pub reticle_visible: bool,
    /// Column-major reticle matrix while visible
    pub reticle_matrix: Option<Vec<f64>>,
    /// Column-major model root matrix
    pub model_matrix: Vec<f64>,
    pub event: Option<EventJs>,
}

impl FrameResultJs {
    pub fn ticket(ticket: Option<SourceTicket>) -> Option<f64> {
        ticket.map(|t| t.session as f64)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceJs {
    pub path: Vec<usize>,
    /// `"normal"`, `"highlighted"` or `"dimmed"`
    pub mode: &'static str,
    pub opacity: f32,
}

impl AppearanceJs {
    pub fn new(path: &[usize], appearance: Appearance) -> Self {
        let (mode, opacity) = match appearance {
            Appearance::Normal => ("normal", 1.0),
            Appearance::Highlighted => ("highlighted", 1.0),
            Appearance::Dimmed(opacity) => ("dimmed", opacity),
        };
        Self {
            path: path.to_vec(),
            mode,
            opacity,
        }
    }
}
