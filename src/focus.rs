//! Debounced per-axis focus bins.
//!
//! The tracker averages the recent alignment samples, buckets the mean
//! into a calibration bin per axis and latches that bin. After every
//! decision an axis enters a dead time of `reset_delay`; while it lasts,
//! the latched bin is left untouched even if the mean moved elsewhere.
//! A stable bin keeps refreshing the dead time, so a change needs the
//! mean to sit in the new bin once the window has lapsed.

use crate::{
    axis::{AlignmentVector, Axis, AxisMap},
    calibration::AxisRangeModel,
    memory::SampleMemory,
    Result,
};
use log::debug;
use std::time::{Duration, Instant};

/// Latched focus of a single axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusState {
    /// Currently latched bin, `None` until the first decision
    pub active_bin: Option<usize>,
    /// Bin changes are suppressed until this instant has passed
    pub ignore_until: Option<Instant>,
}

impl FocusState {
    fn is_suppressed(&self, now: Instant) -> bool {
        self.ignore_until.map_or(false, |until| now <= until)
    }
}

/// Active focus bin of every axis
pub type FocusAreas = AxisMap<Option<usize>>;

/// Maintains sample memory and debounced focus bins
#[derive(Debug, Clone)]
pub struct FocusAreaTracker {
    memory: SampleMemory,
    states: AxisMap<FocusState>,
    reset_delay: Duration,
}

impl FocusAreaTracker {
    /// Tracker averaging the last `memory_size` samples
    ///
    /// # Errors
    ///
    /// Returns an error if `memory_size` is zero
    pub fn new(memory_size: usize, reset_delay: Duration) -> Result<Self> {
        Ok(Self {
            memory: SampleMemory::new(memory_size)?,
            states: AxisMap::default(),
            reset_delay,
        })
    }

    /// Record a new alignment sample
    pub fn push_sample(&mut self, sample: AlignmentVector) {
        self.memory.push(sample);
    }

    /// Recompute the latched bins from the sample mean at time `now`
    ///
    /// With an empty memory the previous bins are returned unchanged.
    pub fn compute_active_focus_areas(&mut self, ranges: &AxisRangeModel, now: Instant) -> FocusAreas {
        let Some(mean) = self.memory.mean() else {
            return self.active_focus_areas();
        };

        for axis in Axis::ALL {
            let bin = ranges.bin_index(axis, mean[axis.index()]);
            let state = &mut self.states[axis];

            if state.is_suppressed(now) {
                continue;
            }

            if state.active_bin != Some(bin) {
                debug!("Focus on axis {axis} moved from {:?} to bin {bin}", state.active_bin);
                state.active_bin = Some(bin);
            }
            state.ignore_until = Some(now + self.reset_delay);
        }

        self.active_focus_areas()
    }

    /// Latched bins without recomputation
    #[must_use]
    pub fn active_focus_areas(&self) -> FocusAreas {
        self.states.map(|_, state| state.active_bin)
    }

    /// Focus state of `axis`
    #[must_use]
    pub fn state(&self, axis: Axis) -> FocusState {
        self.states[axis]
    }

    /// Forget samples and latched bins
    pub fn reset(&mut self) {
        self.memory.clear();
        self.states = AxisMap::default();
    }
}
