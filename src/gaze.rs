//! Tracking / returning decisions driven by viewing flags.
//!
//! Any observation with a viewing flag set puts the machine in
//! [`GazeState::Tracking`] and refreshes the last view time. On the rising
//! edge the calibrated range is recentered around the observed alignment.
//! Observations without a viewing flag only drop the machine into
//! [`GazeState::Returning`] once the grace period since the last view has
//! elapsed; from then on the target is the upper bound of every axis.

use crate::{
    axis::{AlignmentVector, AxisMap},
    calibration::AxisRangeModel,
};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Which targets the viewer is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewingFlags {
    pub left_mirror: bool,
    pub right_mirror: bool,
    /// Any other named viewing target
    pub other_target: bool,
}

impl ViewingFlags {
    /// Looking at nothing
    pub const NONE: Self = Self {
        left_mirror: false,
        right_mirror: false,
        other_target: false,
    };

    /// Looking at both mirrors
    pub const BOTH_MIRRORS: Self = Self {
        left_mirror: true,
        right_mirror: true,
        other_target: false,
    };

    /// True when any flag is set
    #[must_use]
    pub const fn any(&self) -> bool {
        self.left_mirror || self.right_mirror || self.other_target
    }
}

/// One head pose input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeObservation {
    /// Raw head position as delivered upstream
    pub position: AlignmentVector,
    pub flags: ViewingFlags,
}

impl GazeObservation {
    #[must_use]
    pub const fn new(position: AlignmentVector, flags: ViewingFlags) -> Self {
        Self { position, flags }
    }
}

/// Tracking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeState {
    /// Following the live alignment
    Tracking,
    /// Easing back toward the rest position
    Returning,
}

/// Edge produced by an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeTransition {
    /// State unchanged
    None,
    /// Entered tracking; `recentered` tells whether the range was shifted
    EnteredTracking { recentered: bool },
    /// Grace period elapsed, now returning to rest
    EnteredReturning,
}

/// Tuning of the state machine
#[derive(Debug, Clone)]
pub struct GazeSettings {
    pub grace_period: Duration,
    pub recenter_on_view: bool,
    pub recenter_offset: AxisMap<f64>,
}

/// Decides between tracking and returning on every observation
#[derive(Debug, Clone)]
pub struct GazeStateMachine {
    settings: GazeSettings,
    state: GazeState,
    last_view: Instant,
    live_target: Option<AlignmentVector>,
}

impl GazeStateMachine {
    /// Start in [`GazeState::Returning`] with the grace clock starting at `now`
    #[must_use]
    pub fn new(settings: GazeSettings, now: Instant) -> Self {
        Self {
            settings,
            state: GazeState::Returning,
            last_view: now,
            live_target: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> GazeState {
        self.state
    }

    #[must_use]
    pub const fn last_view(&self) -> Instant {
        self.last_view
    }

    /// Last alignment observed while viewing
    #[must_use]
    pub const fn live_target(&self) -> Option<AlignmentVector> {
        self.live_target
    }

    /// Feed one observation; `alignment` is already in tracking coordinates
    pub fn observe(
        &mut self,
        alignment: AlignmentVector,
        flags: ViewingFlags,
        now: Instant,
        ranges: &mut AxisRangeModel,
    ) -> GazeTransition {
        if flags.any() {
            self.last_view = now;
            self.live_target = Some(alignment);

            if self.state == GazeState::Tracking {
                return GazeTransition::None;
            }

            self.state = GazeState::Tracking;
            if self.settings.recenter_on_view {
                ranges.recenter(&alignment, &self.settings.recenter_offset);
                info!("View started, range recentered around {:?}", alignment.as_slice());
            } else {
                info!("View started");
            }
            return GazeTransition::EnteredTracking {
                recentered: self.settings.recenter_on_view,
            };
        }

        let idle = now.saturating_duration_since(self.last_view);
        if self.state == GazeState::Tracking && idle >= self.settings.grace_period {
            self.state = GazeState::Returning;
            info!("No view for {:.1}s, returning to rest", idle.as_secs_f64());
            return GazeTransition::EnteredReturning;
        }

        debug!("Observation without view, idle for {:.2}s", idle.as_secs_f64());
        GazeTransition::None
    }

    /// Where the smoother should head this tick
    #[must_use]
    pub fn target(&self, ranges: &AxisRangeModel) -> AlignmentVector {
        match (self.state, self.live_target) {
            (GazeState::Tracking, Some(live)) => live,
            _ => ranges.max_values(),
        }
    }
}
