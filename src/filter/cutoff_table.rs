//! Dense FC-to-cutoff lookup table
//!
//! The measured curve is expanded once per chip model so that every
//! register write afterwards costs a single array lookup.

use std::sync::Arc;

use parking_lot::RwLock;

use super::constants::FC_CODES;
use super::curve::{ChipModel, ControlPointTable};
use crate::spline::{self, Point, PointPlotter};

/// Cutoff frequency (Hz) for every FC code
#[derive(Clone, PartialEq, Eq)]
pub struct CutoffTable {
    f0: Box<[i32; FC_CODES]>,
}

impl CutoffTable {
    /// Expand a control-point curve into a full table
    ///
    /// The curve is clamped at both ends (the first and last points act as
    /// their own tangent anchors) and sampled once per code. A
    /// [`ControlPointTable`] is validated on construction, so expansion
    /// cannot fail.
    pub fn from_points(table: &ControlPointTable) -> Self {
        let points: Vec<Point> = table.points().iter().copied().map(Point::from).collect();
        let first = points[0];
        let last = points[points.len() - 1];

        let mut f0 = Box::new([0; FC_CODES]);
        spline::interpolate_unchecked(
            &points,
            first,
            last,
            &mut PointPlotter::new(&mut f0[..]),
            1.0,
        );

        log::debug!(
            "expanded {} control points into {} cutoff entries ({} Hz .. {} Hz)",
            points.len(),
            FC_CODES,
            f0[0],
            f0[FC_CODES - 1]
        );
        Self { f0 }
    }

    /// Expand the built-in curve of `model`
    pub fn for_model(model: ChipModel) -> Self {
        Self::from_points(&model.control_points())
    }

    /// Cutoff frequency in Hz for an FC code (masked to 11 bits)
    #[inline]
    pub fn frequency(&self, fc: u16) -> i32 {
        self.f0[(fc & 0x7ff) as usize]
    }

    /// All 2048 entries
    pub fn as_slice(&self) -> &[i32; FC_CODES] {
        &self.f0
    }

    /// Number of entries (always 2048)
    pub fn len(&self) -> usize {
        self.f0.len()
    }

    /// Always false
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for CutoffTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CutoffTable")
            .field("f0[0]", &self.f0[0])
            .field("f0[1023]", &self.f0[1023])
            .field("f0[1024]", &self.f0[1024])
            .field("f0[2047]", &self.f0[FC_CODES - 1])
            .finish_non_exhaustive()
    }
}

/// Cross-thread handle to a filter's live cutoff table
///
/// The filter builds a replacement table completely before publishing it, so
/// a snapshot is always either the old table or the new one.
#[derive(Debug, Clone)]
pub struct SharedCutoffTable {
    inner: Arc<RwLock<Arc<CutoffTable>>>,
}

impl SharedCutoffTable {
    /// Create a handle publishing `table`
    pub fn new(table: Arc<CutoffTable>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// The table currently published
    pub fn snapshot(&self) -> Arc<CutoffTable> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the published table
    pub(crate) fn publish(&self, table: Arc<CutoffTable>) {
        *self.inner.write() = table;
    }
}
