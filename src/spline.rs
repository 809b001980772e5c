//! Clamped cubic interpolation of measured curves
//!
//! Walks an ordered list of points and evaluates a piecewise cubic Hermite
//! curve at evenly spaced abscissas, handing every value to a [`PlotSink`].
//! The curve passes through every input point.
//!
//! # Tangents
//! Interior tangents are estimated from the neighbouring points
//! (`(y[i+1] - y[i-1]) / (x[i+1] - x[i-1])`). Where a neighbour shares its x
//! with the segment end (an anchor, or one half of a jump), that end uses the
//! natural-end estimate `(3 * slope - k_other) / 2` instead. When both
//! neighbours are coincident the segment is a straight line.
//!
//! # Repeated abscissas
//! Consecutive points with the same x describe a vertical jump. The
//! zero-width segment between them is skipped, so the value plotted at that
//! x by the *following* segment overwrites the one from the segment before.
//! Measured data relies on this: the MOS 6581 cutoff curve drops from 6000 Hz
//! at FC 1023 to 4600 Hz at FC 1024.

use crate::{Result, SidFilterError};

/// A curve sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Abscissa
    pub x: f64,
    /// Ordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Receiver for interpolated values
pub trait PlotSink {
    /// Store the curve value `y` at abscissa `x`
    fn plot(&mut self, x: f64, y: f64);
}

/// Writes interpolated values into an integer table indexed by `x`
///
/// Negative values are clamped to 0 and the rest rounded to the nearest
/// integer. Abscissas outside the table are dropped.
#[derive(Debug)]
pub struct PointPlotter<'a> {
    output: &'a mut [i32],
}

impl<'a> PointPlotter<'a> {
    /// Create a plotter writing into `output`
    pub fn new(output: &'a mut [i32]) -> Self {
        Self { output }
    }
}

impl PlotSink for PointPlotter<'_> {
    #[inline]
    fn plot(&mut self, x: f64, y: f64) {
        if x < 0.0 {
            return;
        }
        if let Some(slot) = self.output.get_mut(x as usize) {
            *slot = y.max(0.0).round() as i32;
        }
    }
}

/// Interpolate `points` into `sink`, one value every `resolution` steps of x
///
/// `left_anchor` and `right_anchor` stand in for the points beyond either end
/// when estimating tangents. Passing the first and last points themselves
/// clamps the curve so it never overshoots the measured range.
///
/// # Errors
/// Returns [`SidFilterError::InvalidControlPoints`] when fewer than two
/// points are given, a coordinate is not finite, x decreases anywhere in
/// `left_anchor, points.., right_anchor`, or `resolution` is not positive.
pub fn interpolate<S: PlotSink + ?Sized>(
    points: &[Point],
    left_anchor: Point,
    right_anchor: Point,
    sink: &mut S,
    resolution: f64,
) -> Result<()> {
    if points.len() < 2 {
        return Err(SidFilterError::InvalidControlPoints(format!(
            "need at least 2 points, got {}",
            points.len()
        )));
    }
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(SidFilterError::InvalidControlPoints(format!(
            "resolution must be positive, got {resolution}"
        )));
    }

    let walk = anchored(points, left_anchor, right_anchor);
    for (i, p) in walk.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(SidFilterError::InvalidControlPoints(format!(
                "point {i} is not finite: ({}, {})",
                p.x, p.y
            )));
        }
    }
    if let Some(i) = walk.windows(2).position(|w| w[1].x < w[0].x) {
        return Err(SidFilterError::InvalidControlPoints(format!(
            "x decreases from {} to {} at point {}",
            walk[i].x,
            walk[i + 1].x,
            i + 1
        )));
    }

    plot_segments(&walk, sink, resolution);
    Ok(())
}

/// [`interpolate`] for input already known to satisfy its preconditions
///
/// Callers must guarantee at least two finite points with non-decreasing x
/// (anchors included) and a positive resolution.
pub(crate) fn interpolate_unchecked<S: PlotSink + ?Sized>(
    points: &[Point],
    left_anchor: Point,
    right_anchor: Point,
    sink: &mut S,
    resolution: f64,
) {
    debug_assert!(points.len() >= 2);
    plot_segments(&anchored(points, left_anchor, right_anchor), sink, resolution);
}

fn anchored(points: &[Point], left_anchor: Point, right_anchor: Point) -> Vec<Point> {
    let mut walk = Vec::with_capacity(points.len() + 2);
    walk.push(left_anchor);
    walk.extend_from_slice(points);
    walk.push(right_anchor);
    walk
}

fn plot_segments<S: PlotSink + ?Sized>(walk: &[Point], sink: &mut S, resolution: f64) {
    for w in walk.windows(4) {
        let (p0, p1, p2, p3) = (w[0], w[1], w[2], w[3]);

        // Zero-width segment: the jump is carried by the segments around it.
        if p1.x == p2.x {
            continue;
        }

        let slope = (p2.y - p1.y) / (p2.x - p1.x);
        let (k1, k2) = if p0.x == p1.x && p2.x == p3.x {
            (slope, slope)
        } else if p0.x == p1.x {
            let k2 = (p3.y - p1.y) / (p3.x - p1.x);
            ((3.0 * slope - k2) / 2.0, k2)
        } else if p2.x == p3.x {
            let k1 = (p2.y - p0.y) / (p2.x - p0.x);
            (k1, (3.0 * slope - k1) / 2.0)
        } else {
            (
                (p2.y - p0.y) / (p2.x - p0.x),
                (p3.y - p1.y) / (p3.x - p1.x),
            )
        };

        interpolate_segment(p1, p2, k1, k2, sink, resolution);
    }
}

/// Plot one Hermite segment from `p1` to `p2` inclusive
fn interpolate_segment<S: PlotSink + ?Sized>(
    p1: Point,
    p2: Point,
    k1: f64,
    k2: f64,
    sink: &mut S,
    resolution: f64,
) {
    let dx = p2.x - p1.x;
    let steps = (dx / resolution).floor() as usize;

    for step in 0..=steps {
        let x = p1.x + step as f64 * resolution;
        let t = (x - p1.x) / dx;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        let y = h00 * p1.y + h10 * dx * k1 + h01 * p2.y + h11 * dx * k2;
        sink.plot(x, y);
    }
}
