//! Per-axis calibration ranges and their discretised bins.
//!
//! Each axis carries a `[min, max]` range that is mutated at runtime by
//! calibration capture and recentering. Every mutation recomputes the
//! derived [`BinSet`]: `N + 1` evenly spaced edges and the range midpoint.

use crate::{
    axis::{AlignmentVector, Axis, AxisMap},
    constants::{PERCENT_MAX, PERCENT_MIN},
    Error, Result,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Calibrated bounds of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True when `other` lies entirely inside this range
    #[must_use]
    pub fn contains_range(&self, other: &Self) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    /// Swap inverted bounds; returns true if a swap happened
    fn normalize(&mut self) -> bool {
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
            true
        } else {
            false
        }
    }
}

/// Bin edges and midpoint derived from an [`AxisRange`]
#[derive(Debug, Clone, PartialEq)]
pub struct BinSet {
    edges: Vec<f64>,
    midpoint: f64,
}

impl BinSet {
    /// Evenly subdivide `range` into `n_bins` bins
    #[must_use]
    pub fn new(range: AxisRange, n_bins: usize) -> Self {
        let step = range.width() / n_bins as f64;
        let mut edges: Vec<f64> = (0..=n_bins).map(|i| range.min + step * i as f64).collect();
        // Pin the last edge so accumulated error never moves the bound
        if let Some(last) = edges.last_mut() {
            *last = range.max;
        }

        Self {
            edges,
            midpoint: (range.min + range.max) / 2.0,
        }
    }

    /// Ordered bin edges (`n_bins + 1` values)
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Midpoint of the whole range
    #[must_use]
    pub const fn midpoint(&self) -> f64 {
        self.midpoint
    }

    /// Number of bins
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// True when there are no bins
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bin containing `value`; values outside the range saturate to the edge bins
    #[must_use]
    pub fn bin_index(&self, value: f64) -> usize {
        let at_or_below = self.edges.iter().filter(|edge| **edge <= value).count();
        at_or_below.saturating_sub(1).min(self.len().saturating_sub(1))
    }

    fn check_index(&self, axis: Axis, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::InvalidInput(format!(
                "Bin index {index} out of range for axis '{axis}' ({} bins)",
                self.len()
            )));
        }
        Ok(())
    }
}

/// Calibrated ranges for all three axes together with their bins
#[derive(Debug, Clone)]
pub struct AxisRangeModel {
    ranges: AxisMap<AxisRange>,
    bins: AxisMap<BinSet>,
    n_bins: usize,
}

impl AxisRangeModel {
    /// Create a model over the given ranges
    ///
    /// # Errors
    ///
    /// Returns an error if `n_bins` is zero
    pub fn new(ranges: AxisMap<AxisRange>, n_bins: usize) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::InvalidInput("Bin count must be greater than 0".to_string()));
        }

        let mut ranges = ranges;
        for axis in Axis::ALL {
            if ranges[axis].normalize() {
                warn!("Initial range for axis {axis} was inverted, bounds swapped");
            }
        }

        Ok(Self {
            bins: ranges.map(|_, range| BinSet::new(*range, n_bins)),
            ranges,
            n_bins,
        })
    }

    /// Number of bins per axis
    #[must_use]
    pub const fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Current range of `axis`
    #[must_use]
    pub fn range(&self, axis: Axis) -> AxisRange {
        self.ranges[axis]
    }

    /// Current ranges of all axes
    #[must_use]
    pub const fn ranges(&self) -> &AxisMap<AxisRange> {
        &self.ranges
    }

    /// Replace the bounds of `axis`
    pub fn set_range(&mut self, axis: Axis, min: f64, max: f64) {
        self.store(axis, AxisRange::new(min, max));
    }

    /// Widen `axis` so that it includes `value`; never narrows
    pub fn extend(&mut self, axis: Axis, value: f64) {
        let mut range = self.ranges[axis];
        if value < range.min {
            range.min = value;
        }
        if value > range.max {
            range.max = value;
        }
        if range != self.ranges[axis] {
            self.store(axis, range);
        }
    }

    /// Widen every axis to include `alignment`
    pub fn extend_all(&mut self, alignment: &AlignmentVector) {
        for axis in Axis::ALL {
            self.extend(axis, alignment[axis.index()]);
        }
    }

    /// Collapse every axis to the single point `alignment`
    pub fn set_to_point(&mut self, alignment: &AlignmentVector) {
        for axis in Axis::ALL {
            let value = alignment[axis.index()];
            self.set_range(axis, value, value);
        }
    }

    /// Shift every range so that it is centred on `alignment`, keeping its
    /// width, then subtract the per-axis `offset`
    pub fn recenter(&mut self, alignment: &AlignmentVector, offset: &AxisMap<f64>) {
        for axis in Axis::ALL {
            let half = self.ranges[axis].width() * 0.5;
            let center = alignment[axis.index()] - offset[axis];
            self.set_range(axis, center - half, center + half);
        }
    }

    /// Upper bound of every axis, the rest position of the rig
    #[must_use]
    pub fn max_values(&self) -> AlignmentVector {
        AlignmentVector::new(
            self.ranges[Axis::X].max,
            self.ranges[Axis::Y].max,
            self.ranges[Axis::Z].max,
        )
    }

    /// Bin edges of `axis`
    #[must_use]
    pub fn bin_edges(&self, axis: Axis) -> &[f64] {
        self.bins[axis].edges()
    }

    /// Midpoint of the range of `axis`
    #[must_use]
    pub fn midpoint(&self, axis: Axis) -> f64 {
        self.bins[axis].midpoint()
    }

    /// Bin of `axis` containing `value`, saturating at the outer bins
    #[must_use]
    pub fn bin_index(&self, axis: Axis, value: f64) -> usize {
        self.bins[axis].bin_index(value)
    }

    /// Average of the two edges bounding bin `index`
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a valid bin
    pub fn bin_midpoint(&self, axis: Axis, index: usize) -> Result<f64> {
        let bins = &self.bins[axis];
        bins.check_index(axis, index)?;
        Ok((bins.edges[index] + bins.edges[index + 1]) / 2.0)
    }

    /// Like [`bin_midpoint`](Self::bin_midpoint), except that the first bin
    /// reports 0 and the last bin reports 100 so that focus snaps to the
    /// extremes of the rig
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a valid bin
    pub fn bin_midpoint_index_percent(&self, axis: Axis, index: usize) -> Result<f64> {
        let bins = &self.bins[axis];
        bins.check_index(axis, index)?;

        if index == 0 {
            Ok(PERCENT_MIN)
        } else if index == bins.len() - 1 {
            Ok(PERCENT_MAX)
        } else {
            Ok((bins.edges[index] + bins.edges[index + 1]) / 2.0)
        }
    }

    fn store(&mut self, axis: Axis, mut range: AxisRange) {
        if range.normalize() {
            warn!("Range for axis {axis} was inverted, bounds swapped to [{}, {}]", range.min, range.max);
        }
        debug!("Axis {axis} range set to [{:.4}, {:.4}]", range.min, range.max);
        self.ranges[axis] = range;
        self.bins[axis] = BinSet::new(range, self.n_bins);
    }
}
