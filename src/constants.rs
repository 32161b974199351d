//! Constants used throughout the application

use std::time::Duration;

/// Default number of bins per calibrated axis
pub const DEFAULT_BIN_COUNT: usize = 3;

/// Default capacity of the alignment sample memory
pub const DEFAULT_MEMORY_SIZE: usize = 10;

/// Dead time after a focus bin decision, in seconds
pub const DEFAULT_FOCUS_RESET_DELAY_SECS: f64 = 0.1;

/// Smoother step bounds and proportional factor
pub const DEFAULT_MIN_STEP: f64 = 1e-4;
pub const DEFAULT_MAX_STEP: f64 = 5e-3;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;

/// Time without a viewing flag before returning to rest, in seconds
pub const DEFAULT_GRACE_PERIOD_SECS: f64 = 5.0;

/// Offset subtracted from the z range on recenter
pub const DEFAULT_Z_RECENTER_OFFSET: f64 = 0.1;

/// Calibration bound that means "not set yet"
pub const UNSET_BOUND: f64 = -1.0;

/// Percentage reported for an unset or degenerate range
pub const FALLBACK_PERCENT: f64 = 50.0;

/// Percentage domain
pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

/// Base of the inverse zoom formula (`effective = FOV_INVERSION_BASE - fov`)
pub const FOV_INVERSION_BASE: f64 = 200.0;

/// Padding around the zoom highlight rectangle, in pixels
pub const ZOOM_HIGHLIGHT_PADDING: i64 = 5;

/// Stroke width of the zoom highlight rectangle, in pixels
pub const ZOOM_HIGHLIGHT_THICKNESS: i64 = 2;

/// Default lateral biases for the mirror surfaces, in percent
pub const DEFAULT_LEFT_BIAS_PERCENT: f64 = -50.0;
pub const DEFAULT_RIGHT_BIAS_PERCENT: f64 = 50.0;

/// Fraction of the display height used for the crop slice
pub const DEFAULT_SLICE_HEIGHT_FRACTION: f64 = 0.4;

/// Default target frames per second
pub const DEFAULT_FPS: u32 = 60;

/// Tag identifying head pose messages on the wire
pub const HEAD_POSE_MESSAGE_TAG: u32 = 0xC0FF_EE00;

/// Size of the fixed message header in bytes
pub const MESSAGE_HEADER_SIZE: usize = 8;

/// Largest payload accepted by default
pub const DEFAULT_MAX_PAYLOAD_BYTES: u32 = 1 << 20;

/// Idle time before the first TCP keepalive probe
pub const KEEPALIVE_IDLE: Duration = Duration::from_secs(1);

/// Interval between TCP keepalive probes
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(3);

/// Unanswered keepalive probes before the connection is dropped
pub const KEEPALIVE_RETRIES: u32 = 5;

/// Decimal places kept from incoming head positions
pub const POSITION_DECIMALS: i32 = 2;
