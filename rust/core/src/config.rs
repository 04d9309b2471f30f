// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration
//!
//! Every field has a default so hosts can pass a partial JSON object.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for gestures, decals and selection styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Press duration (ms) after which a held select becomes a long press
    pub long_press_ms: f64,
    /// Maximum gap (ms) between two select starts to count as a double tap
    pub double_tap_ms: f64,
    /// Decal box size (x, y, z) in metres
    pub decal_size: [f64; 3],
    /// Opacity applied to unselected elements while a selection is active
    pub selection_dim_opacity: f32,
    /// Radius of the defect marker sphere in metres
    pub marker_radius: f64,
    /// Minimum horizontal length of the wall normal before alignment falls back
    pub degenerate_epsilon: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500.0,
            double_tap_ms: 300.0,
            decal_size: [0.5, 0.5, 0.5],
            selection_dim_opacity: 0.1,
            marker_radius: 0.05,
            degenerate_epsilon: 1e-6,
        }
    }
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the gesture and decal code cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.long_press_ms > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "longPressMs must be positive, got {}",
                self.long_press_ms
            )));
        }
        if !(self.double_tap_ms > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "doubleTapMs must be positive, got {}",
                self.double_tap_ms
            )));
        }
        if self.decal_size.iter().any(|s| !(*s > 0.0)) {
            return Err(Error::InvalidConfig(format!(
                "decalSize components must be positive, got {:?}",
                self.decal_size
            )));
        }
        if !(0.0..=1.0).contains(&self.selection_dim_opacity) {
            return Err(Error::InvalidConfig(format!(
                "selectionDimOpacity must be within 0..=1, got {}",
                self.selection_dim_opacity
            )));
        }
        if !(self.marker_radius > 0.0) || !(self.degenerate_epsilon > 0.0) {
            return Err(Error::InvalidConfig(
                "markerRadius and degenerateEpsilon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gesture_thresholds() {
        let config = ViewerConfig::default();
        assert_eq!(config.long_press_ms, 500.0);
        assert_eq!(config.double_tap_ms, 300.0);
        assert_eq!(config.decal_size, [0.5, 0.5, 0.5]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{"longPressMs": 650}"#).unwrap();
        assert_eq!(config.long_press_ms, 650.0);
        assert_eq!(config.double_tap_ms, 300.0);
    }

    #[test]
    fn test_rejects_non_positive_decal_size() {
        let err = ViewerConfig::from_json(r#"{"decalSize": [0.5, 0.0, 0.5]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let config = ViewerConfig {
            double_tap_ms: f64::NAN,
            ..ViewerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
