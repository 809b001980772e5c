//! Chip models and measured cutoff curves

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::{
    F0_POINTS_6581, F0_POINTS_8580, FC_MAX, VOICE_DC_6581, VOICE_DC_8580,
};
use crate::spline::Point;
use crate::{Result, SidFilterError};

/// SID chip revision
///
/// Selects the cutoff curve and the voice DC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipModel {
    /// Original NMOS part (C64 "breadbin")
    #[default]
    Mos6581,
    /// HMOS-II revision (C64C, C128DCR)
    Mos8580,
}

impl ChipModel {
    /// Built-in cutoff curve measured for this model
    pub fn control_points(self) -> ControlPointTable {
        match self {
            ChipModel::Mos6581 => ControlPointTable::builtin(&F0_POINTS_6581),
            ChipModel::Mos8580 => ControlPointTable::builtin(&F0_POINTS_8580),
        }
    }

    /// DC bias of each voice output, to be subtracted downstream
    pub fn voice_dc(self) -> i32 {
        match self {
            ChipModel::Mos6581 => VOICE_DC_6581,
            ChipModel::Mos8580 => VOICE_DC_8580,
        }
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipModel::Mos6581 => write!(f, "MOS6581"),
            ChipModel::Mos8580 => write!(f, "MOS8580"),
        }
    }
}

impl FromStr for ChipModel {
    type Err = SidFilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "6581" | "mos6581" => Ok(ChipModel::Mos6581),
            "8580" | "mos8580" => Ok(ChipModel::Mos8580),
            _ => Err(SidFilterError::ConfigError(format!(
                "unknown chip model '{s}' (expected 6581 or 8580)"
            ))),
        }
    }
}

/// One measured (FC code, cutoff frequency) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// FC register code (0-2047)
    pub code: u16,
    /// Cutoff frequency in Hz
    pub frequency: i32,
}

impl ControlPoint {
    /// Create a new control point
    pub const fn new(code: u16, frequency: i32) -> Self {
        Self { code, frequency }
    }
}

impl From<ControlPoint> for Point {
    fn from(p: ControlPoint) -> Self {
        Point::new(f64::from(p.code), f64::from(p.frequency))
    }
}

/// Ordered cutoff curve covering FC codes 0 through 2047
///
/// Codes never decrease. Two consecutive points may share a code; the curve
/// then jumps at that code instead of passing smoothly through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPointTable {
    points: Cow<'static, [ControlPoint]>,
}

impl ControlPointTable {
    /// Validate and wrap a caller-supplied curve
    ///
    /// # Errors
    /// Returns [`SidFilterError::InvalidControlPoints`] if the curve has fewer
    /// than two points, does not start at code 0 and end at code 2047, has a
    /// decreasing code, or has a negative frequency.
    pub fn new(points: Vec<ControlPoint>) -> Result<Self> {
        Self::validate(&points)?;
        Ok(Self {
            points: Cow::Owned(points),
        })
    }

    /// Wrap one of the measured curves shipped with the crate
    pub(crate) const fn builtin(points: &'static [ControlPoint]) -> Self {
        Self {
            points: Cow::Borrowed(points),
        }
    }

    /// Check the invariants every cutoff curve must satisfy
    pub fn validate(points: &[ControlPoint]) -> Result<()> {
        let invalid = |msg: String| Err(SidFilterError::InvalidControlPoints(msg));

        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return invalid("curve is empty".into());
        };
        if points.len() < 2 {
            return invalid(format!("need at least 2 points, got {}", points.len()));
        }
        if first.code != 0 {
            return invalid(format!("first code must be 0, got {}", first.code));
        }
        if last.code != FC_MAX {
            return invalid(format!("last code must be {FC_MAX}, got {}", last.code));
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].code < pair[0].code {
                return invalid(format!(
                    "code decreases from {} to {} at point {}",
                    pair[0].code,
                    pair[1].code,
                    i + 1
                ));
            }
        }
        if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| p.frequency < 0) {
            return invalid(format!("negative frequency {} at point {i}", p.frequency));
        }
        Ok(())
    }

    /// The control points, in order
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Number of control points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated table
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the table borrows one of the built-in curves
    pub fn is_builtin(&self) -> bool {
        matches!(self.points, Cow::Borrowed(_))
    }

    /// Codes at which the curve jumps (repeated consecutive codes)
    pub fn discontinuities(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self
            .points
            .windows(2)
            .filter(|pair| pair[0].code == pair[1].code)
            .map(|pair| pair[0].code)
            .collect();
        codes.dedup();
        codes
    }
}
