//! The mirror core: observations in, per-surface view windows out.
//!
//! [`MirrorCore`] owns every piece of tracking state. Observations arrive at
//! the network rate through [`MirrorCore::observe`]; [`MirrorCore::tick`]
//! runs at the display rate, advances the smoothed alignment by one step
//! and maps it to a [`ViewWindow`] per [`Surface`]. Callers serialise access,
//! typically by holding the core behind a single mutex.

use crate::{
    axis::{AlignmentVector, Axis, AxisMap},
    calibration::AxisRangeModel,
    config::Config,
    constants::FALLBACK_PERCENT,
    focus::{FocusAreaTracker, FocusAreas},
    gaze::{GazeSettings, GazeState, GazeStateMachine, GazeTransition, ViewingFlags},
    smoother::AlignmentSmoother,
    view_window::{percentage_between, Surface, ViewWindow, ViewWindowMapper},
    Result,
};
use log::{debug, info};
use std::time::Instant;

/// Output of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Tick counter, starting at 1
    pub sequence: u64,
    /// Windows in [`Surface::ALL`] order
    pub windows: [ViewWindow; 3],
    /// Percentage of every axis inside its calibrated range
    pub percent: AxisMap<f64>,
    pub focus: FocusAreas,
    pub state: GazeState,
    /// Smoothed alignment after this tick's step
    pub alignment: AlignmentVector,
}

impl Frame {
    /// Window of `surface`
    #[must_use]
    pub fn window(&self, surface: Surface) -> &ViewWindow {
        match surface {
            Surface::LeftMirror => &self.windows[0],
            Surface::Windshield => &self.windows[1],
            Surface::RightMirror => &self.windows[2],
        }
    }
}

/// Alignment tracking and view window computation
#[derive(Debug)]
pub struct MirrorCore {
    ranges: AxisRangeModel,
    focus: FocusAreaTracker,
    smoother: AlignmentSmoother,
    gaze: GazeStateMachine,
    mapper: ViewWindowMapper,
    invert_input: bool,
    snap_to_focus: bool,
    recenter_offset: AxisMap<f64>,
    calibration_active: bool,
    frozen: AxisMap<Option<f64>>,
    last_observed: Option<AlignmentVector>,
    sequence: u64,
}

impl MirrorCore {
    /// Build the core from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: &Config, now: Instant) -> Result<Self> {
        config.validate()?;

        let ranges = AxisRangeModel::new(config.calibration.ranges, config.calibration.n_bins)?;
        let gaze = GazeStateMachine::new(
            GazeSettings {
                grace_period: config.gaze.grace_period(),
                recenter_on_view: config.calibration.recenter_on_view,
                recenter_offset: config.calibration.recenter_offset,
            },
            now,
        );
        // Start at rest
        let smoother = AlignmentSmoother::new(ranges.max_values(), config.smoothing);

        info!(
            "Mirror core ready: {} bins, grace period {:.1}s, zoom {}",
            ranges.n_bins(),
            config.gaze.grace_period_secs,
            config.view.zoom
        );

        Ok(Self {
            focus: FocusAreaTracker::new(config.focus.memory_size, config.focus.reset_delay())?,
            mapper: ViewWindowMapper::new(config.view_settings()),
            frozen: config
                .view
                .freeze
                .map(|_, frozen| frozen.then_some(FALLBACK_PERCENT)),
            invert_input: config.calibration.invert_input,
            recenter_offset: config.calibration.recenter_offset,
            snap_to_focus: config.focus.snap_to_focus,
            calibration_active: false,
            last_observed: None,
            sequence: 0,
            ranges,
            smoother,
            gaze,
        })
    }

    /// Feed one head pose observation received now
    pub fn observe(&mut self, position: AlignmentVector, flags: ViewingFlags) -> GazeTransition {
        self.observe_at(position, flags, Instant::now())
    }

    /// Feed one head pose observation received at `now`
    pub fn observe_at(&mut self, position: AlignmentVector, flags: ViewingFlags, now: Instant) -> GazeTransition {
        if !position.iter().all(|v| v.is_finite()) {
            debug!("Dropping non-finite observation {:?}", position.as_slice());
            return GazeTransition::None;
        }

        let alignment = if self.invert_input { -position } else { position };
        self.last_observed = Some(alignment);

        if self.calibration_active {
            self.ranges.extend_all(&alignment);
        }
        if flags.any() {
            self.focus.push_sample(alignment);
        }

        self.gaze.observe(alignment, flags, now, &mut self.ranges)
    }

    /// Advance one frame over a source image of `source_dims`
    pub fn tick(&mut self, source_dims: (u32, u32)) -> Frame {
        self.tick_at(Instant::now(), source_dims)
    }

    /// Advance one frame at `now` over a source image of `source_dims`
    pub fn tick_at(&mut self, now: Instant, source_dims: (u32, u32)) -> Frame {
        self.sequence += 1;

        let focus = self.focus.compute_active_focus_areas(&self.ranges, now);
        let target = self.target(&focus);
        let alignment = self.smoother.step(&target);
        let percent = self.percentages(&alignment);

        let windows = Surface::ALL.map(|surface| self.mapper.map(surface, source_dims, &percent));

        Frame {
            sequence: self.sequence,
            windows,
            percent,
            focus,
            state: self.gaze.state(),
            alignment,
        }
    }

    fn target(&self, focus: &FocusAreas) -> AlignmentVector {
        let live = self.gaze.target(&self.ranges);
        if !self.snap_to_focus || self.gaze.state() != GazeState::Tracking {
            return live;
        }

        AlignmentVector::from_fn(|i, _| {
            let axis = Axis::ALL[i];
            focus[axis]
                .and_then(|bin| self.ranges.bin_midpoint(axis, bin).ok())
                .unwrap_or(live[i])
        })
    }

    fn percentages(&self, alignment: &AlignmentVector) -> AxisMap<f64> {
        AxisMap::from_fn(|axis| {
            self.frozen[axis].unwrap_or_else(|| {
                let range = self.ranges.range(axis);
                percentage_between(alignment[axis.index()], range.min, range.max)
            })
        })
    }

    /// Toggle live calibration; while active every observation widens the ranges
    pub fn set_calibration_active(&mut self, active: bool) {
        if self.calibration_active != active {
            info!("Calibration {}", if active { "started" } else { "stopped" });
        }
        self.calibration_active = active;
    }

    /// Hold `axis` at its current percentage, or release it
    pub fn set_axis_freeze(&mut self, axis: Axis, frozen: bool) {
        self.frozen[axis] = if frozen {
            let latched = self.percentages(&self.smoother.alignment())[axis];
            info!("Axis {axis} frozen at {latched:.1}%");
            Some(latched)
        } else {
            info!("Axis {axis} released");
            None
        };
    }

    /// Collapse every range onto the current position
    pub fn set_range_to_current(&mut self) {
        let current = self.current_position();
        info!("Ranges reset to {:?}", current.as_slice());
        self.ranges.set_to_point(&current);
    }

    /// Widen every range to include the current position
    pub fn extend_range_with_current(&mut self) {
        let current = self.current_position();
        self.ranges.extend_all(&current);
    }

    /// Recenter every range around the current position, minus the configured offset
    pub fn recenter(&mut self) {
        let current = self.current_position();
        info!("Ranges recentered around {:?}", current.as_slice());
        self.ranges.recenter(&current, &self.recenter_offset);
    }

    /// Last observed alignment, or the smoothed one before any observation
    fn current_position(&self) -> AlignmentVector {
        self.last_observed.unwrap_or_else(|| self.smoother.alignment())
    }

    #[must_use]
    pub const fn calibration_active(&self) -> bool {
        self.calibration_active
    }

    #[must_use]
    pub fn is_frozen(&self, axis: Axis) -> bool {
        self.frozen[axis].is_some()
    }

    #[must_use]
    pub const fn alignment(&self) -> AlignmentVector {
        self.smoother.alignment()
    }

    #[must_use]
    pub const fn ranges(&self) -> &AxisRangeModel {
        &self.ranges
    }

    #[must_use]
    pub const fn state(&self) -> GazeState {
        self.gaze.state()
    }

    #[must_use]
    pub fn focus(&self) -> FocusAreas {
        self.focus.active_focus_areas()
    }

    pub fn set_zoom(&mut self, zoom: bool) {
        self.mapper.set_zoom(zoom);
    }
}
