//! Head-tracked view windows for a smart mirror rig.
//!
//! This library turns a noisy stream of 3D head positions into stable crop
//! windows over a wide-angle source image, one per output surface (left
//! mirror, windshield, right mirror):
//! - Calibrated per-axis ranges, discretized into focus bins
//! - Debounced focus bins over a rolling sample mean
//! - Velocity-capped smoothing of the tracked alignment
//! - A tracking / returning state machine with a grace period
//! - Percentage based crop and simulated optical zoom windows
//!
//! The pipeline consists of:
//! 1. [`MirrorCore::observe`](mirror::MirrorCore::observe) for every received head pose
//! 2. [`MirrorCore::tick`](mirror::MirrorCore::tick) once per display frame
//! 3. [`ViewWindow::render`](view_window::ViewWindow::render) to crop and scale the source image
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use smart_mirror::{
//!     axis::AlignmentVector, config::Config, gaze::ViewingFlags, mirror::MirrorCore,
//!     utils::image_ops, view_window::Surface,
//! };
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut core = MirrorCore::new(&Config::default(), Instant::now())?;
//! let source = image_ops::test_pattern(1920, 1080);
//!
//! // Head pose from upstream, looking at the left mirror
//! let flags = ViewingFlags { left_mirror: true, ..ViewingFlags::NONE };
//! core.observe(AlignmentVector::new(0.05, -0.02, 0.01), flags);
//!
//! // Once per display frame
//! let frame = core.tick(source.dimensions());
//! let left = frame.window(Surface::LeftMirror);
//! let image = left.render(&source)?;
//! println!("Left mirror: {}x{} from ({}, {})", image.width(), image.height(), left.start_x, left.start_y);
//! # Ok(())
//! # }
//! ```
//!
//! ## Calibration
//!
//! ```no_run
//! use smart_mirror::{axis::Axis, config::Config, mirror::MirrorCore};
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut core = MirrorCore::new(&Config::default(), Instant::now())?;
//!
//! // Sweep the head through its range while calibration is active
//! core.set_calibration_active(true);
//! // ... observations widen the ranges ...
//! core.set_calibration_active(false);
//!
//! // Hold the vertical position
//! core.set_axis_freeze(Axis::Y, true);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading the head pose stream
//!
//! ```no_run
//! use smart_mirror::{constants::HEAD_POSE_MESSAGE_TAG, wire::read_observation};
//! use std::net::TcpStream;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stream = TcpStream::connect("localhost:7000")?;
//! let observation = read_observation(&mut stream, HEAD_POSE_MESSAGE_TAG, 1 << 20)?;
//! println!("Head at {:?}, flags {:?}", observation.position, observation.flags);
//! # Ok(())
//! # }
//! ```

/// Axis identifiers and per-axis storage
pub mod axis;

/// Calibrated ranges and their bins
pub mod calibration;

/// Rolling memory of alignment samples
pub mod memory;

/// Debounced focus bins
pub mod focus;

/// Velocity-capped alignment smoothing
pub mod smoother;

/// Tracking / returning state machine
pub mod gaze;

/// Percentage mapping and crop window geometry
pub mod view_window;

/// Observation and tick facade over all components
pub mod mirror;

/// Head pose stream framing and decoding
pub mod wire;

/// Frame pacing
pub mod scheduler;

/// Frame hand-off to presentation workers
pub mod presenter;

/// Utility functions for numeric casts and image operations
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
