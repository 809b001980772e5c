//! Filter settings
//!
//! Serializable description of a filter setup: chip model, enable flag and
//! an optional replacement cutoff curve.
//!
//! ```json
//! {
//!   "chip_model": "mos8580",
//!   "enabled": true,
//!   "cutoff_curve": [
//!     { "code": 0, "frequency": 30 },
//!     { "code": 2047, "frequency": 12000 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::{ChipModel, ControlPoint, ControlPointTable};
use crate::Result;

/// Filter setup loaded from or saved to JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Chip model selecting the built-in curve and voice DC offset
    pub chip_model: ChipModel,
    /// Run the filter (false routes every input around it)
    pub enabled: bool,
    /// Replacement cutoff curve (0..=2047, codes non-decreasing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff_curve: Option<Vec<ControlPoint>>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            chip_model: ChipModel::default(),
            enabled: true,
            cutoff_curve: None,
        }
    }
}

impl FilterSettings {
    /// Settings for a chip model with its built-in curve
    pub fn for_model(chip_model: ChipModel) -> Self {
        Self {
            chip_model,
            ..Self::default()
        }
    }

    /// Parse settings from JSON and validate them
    ///
    /// # Errors
    /// Fails on malformed JSON or an invalid cutoff curve.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not hold valid settings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading filter settings from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the cutoff curve, if any
    pub fn validate(&self) -> Result<()> {
        if let Some(points) = &self.cutoff_curve {
            ControlPointTable::validate(points)?;
        }
        Ok(())
    }
}
