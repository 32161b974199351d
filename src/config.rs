//! Configuration management for the smart mirror application

use crate::{
    axis::AxisMap,
    calibration::AxisRange,
    constants::{
        DEFAULT_BIN_COUNT, DEFAULT_FOCUS_RESET_DELAY_SECS, DEFAULT_FPS, DEFAULT_GRACE_PERIOD_SECS,
        DEFAULT_LEFT_BIAS_PERCENT, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_MEMORY_SIZE, DEFAULT_RIGHT_BIAS_PERCENT,
        DEFAULT_SLICE_HEIGHT_FRACTION, DEFAULT_Z_RECENTER_OFFSET, HEAD_POSE_MESSAGE_TAG,
    },
    smoother::SmootherParams,
    view_window::ViewSettings,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibrated ranges and recentering
    pub calibration: CalibrationConfig,

    /// Focus bin tracking
    pub focus: FocusConfig,

    /// Alignment smoothing
    pub smoothing: SmootherParams,

    /// Tracking / returning state machine
    pub gaze: GazeConfig,

    /// Crop window geometry
    pub view: ViewConfig,

    /// Output displays
    pub display: DisplayConfig,

    /// Head pose stream
    pub network: NetworkConfig,
}

/// Calibration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Initial range per axis
    pub ranges: AxisMap<AxisRange>,

    /// Number of bins per axis
    pub n_bins: usize,

    /// Offset subtracted from each axis when recentering
    pub recenter_offset: AxisMap<f64>,

    /// Recenter the ranges whenever a view starts
    pub recenter_on_view: bool,

    /// Negate raw head positions before tracking
    pub invert_input: bool,
}

/// Focus tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Number of samples averaged for focus decisions
    pub memory_size: usize,

    /// Dead time after a focus decision, in seconds
    pub reset_delay_secs: f64,

    /// Track the midpoint of the active focus bin instead of the live position
    pub snap_to_focus: bool,
}

/// Gaze state machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Seconds without a view before returning to rest
    pub grace_period_secs: f64,
}

/// View window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Crop height as a fraction of the display height
    pub slice_height_fraction: f64,

    /// Use the simulated optical zoom instead of plain cropping
    pub zoom: bool,

    /// Horizontal bias of the left mirror, in percent
    pub left_bias_percent: f64,

    /// Horizontal bias of the right mirror, in percent
    pub right_bias_percent: f64,

    /// Axes whose percentage is held fixed
    pub freeze: AxisMap<bool>,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target framerate
    pub target_fps: u32,

    /// Display width
    pub width: u32,

    /// Display height
    pub height: u32,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address of the head pose server
    pub address: String,

    /// Tag of head pose messages
    pub message_tag: u32,

    /// Largest accepted payload
    pub max_payload_bytes: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            ranges: AxisMap::new(
                AxisRange::new(-0.21, 0.19),
                AxisRange::new(-0.08, 0.12),
                AxisRange::new(-0.05, 0.1),
            ),
            n_bins: DEFAULT_BIN_COUNT,
            recenter_offset: AxisMap::new(0.0, 0.0, DEFAULT_Z_RECENTER_OFFSET),
            recenter_on_view: true,
            invert_input: true,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            reset_delay_secs: DEFAULT_FOCUS_RESET_DELAY_SECS,
            snap_to_focus: false,
        }
    }
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            slice_height_fraction: DEFAULT_SLICE_HEIGHT_FRACTION,
            zoom: false,
            left_bias_percent: DEFAULT_LEFT_BIAS_PERCENT,
            right_bias_percent: DEFAULT_RIGHT_BIAS_PERCENT,
            freeze: AxisMap::new(false, true, false),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_FPS,
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: "localhost:7000".to_string(),
            message_tag: HEAD_POSE_MESSAGE_TAG,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl FocusConfig {
    /// Dead time as a duration
    #[must_use]
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs_f64(self.reset_delay_secs.max(0.0))
    }
}

impl GazeConfig {
    /// Grace period as a duration
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period_secs.max(0.0))
    }
}

impl DisplayConfig {
    /// Time budget of one frame
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// View geometry derived from the display and view sections
    #[must_use]
    pub fn view_settings(&self) -> ViewSettings {
        let mut settings =
            ViewSettings::for_display(self.display.width, self.display.height, self.view.slice_height_fraction);
        settings.left_bias_percent = self.view.left_bias_percent;
        settings.right_bias_percent = self.view.right_bias_percent;
        settings.zoom = self.view.zoom;
        settings
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate calibration
        for (axis, range) in self.calibration.ranges.iter() {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(Error::ConfigError(format!("Range of axis {axis} must be finite")));
            }
        }
        if self.calibration.n_bins == 0 {
            return Err(Error::ConfigError("Bin count must be greater than 0".to_string()));
        }

        // Validate focus tracking
        if self.focus.memory_size == 0 {
            return Err(Error::ConfigError("Memory size must be greater than 0".to_string()));
        }
        if !(self.focus.reset_delay_secs.is_finite() && self.focus.reset_delay_secs >= 0.0) {
            return Err(Error::ConfigError("Focus reset delay must be finite and not negative".to_string()));
        }

        self.smoothing.validate()?;

        if !(self.gaze.grace_period_secs.is_finite() && self.gaze.grace_period_secs >= 0.0) {
            return Err(Error::ConfigError("Grace period must be finite and not negative".to_string()));
        }

        // Validate view and display settings
        if !(self.view.slice_height_fraction > 0.0 && self.view.slice_height_fraction <= 1.0) {
            return Err(Error::ConfigError(
                "Slice height fraction must be in (0, 1]".to_string(),
            ));
        }
        if self.display.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Error::ConfigError("Display size must be non-zero".to_string()));
        }

        if self.network.max_payload_bytes == 0 {
            return Err(Error::ConfigError("Max payload size must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Smart Mirror Configuration

# Calibrated head position ranges
calibration:
  ranges:
    x: { min: -0.21, max: 0.19 }
    y: { min: -0.08, max: 0.12 }
    z: { min: -0.05, max: 0.1 }
  n_bins: 3
  recenter_offset: { x: 0.0, y: 0.0, z: 0.1 }
  recenter_on_view: true
  invert_input: true

# Focus bins
focus:
  memory_size: 10
  reset_delay_secs: 0.1
  snap_to_focus: false

# Alignment smoothing
smoothing:
  min_step: 0.0001
  max_step: 0.005
  smoothing_factor: 0.5

# Tracking / returning
gaze:
  grace_period_secs: 5.0

# Crop windows
view:
  slice_height_fraction: 0.4
  zoom: false
  left_bias_percent: -50.0
  right_bias_percent: 50.0
  freeze: { x: false, y: true, z: false }

# Output displays
display:
  target_fps: 60
  width: 1920
  height: 1080

# Head pose stream
network:
  address: "localhost:7000"
  message_tag: 3237998080
  max_payload_bytes: 1048576
"#;
