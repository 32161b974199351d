//! Hand-off of rendered frames to per-surface presentation workers.
//!
//! Each surface owns a [`FrameSlot`], a single-frame mailbox. The tick loop
//! publishes into it without ever waiting on the consumer, overwriting any
//! frame that was not picked up yet; a slow presenter simply skips frames.

use crate::{view_window::Surface, Error, Result};
use image::RgbImage;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Frame rendered for one surface
#[derive(Debug, Clone)]
pub struct SurfaceFrame {
    pub surface: Surface,
    pub sequence: u64,
    pub image: RgbImage,
}

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<Arc<SurfaceFrame>>,
    closed: bool,
}

/// Latest-frame mailbox shared between the tick loop and a presenter
#[derive(Debug, Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame and wake the consumer
    pub fn publish(&self, frame: SurfaceFrame) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.latest = Some(Arc::new(frame));
        drop(state);
        self.ready.notify_all();
    }

    /// Block until a frame newer than `last_sequence` is available
    ///
    /// Returns `None` once the slot is closed and its last frame was taken.
    pub fn wait_newer(&self, last_sequence: u64) -> Option<Arc<SurfaceFrame>> {
        let mut state = self.state.lock();
        loop {
            if let Some(frame) = state.latest.as_ref().filter(|f| f.sequence > last_sequence) {
                return Some(Arc::clone(frame));
            }
            if state.closed {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Most recent frame without blocking
    #[must_use]
    pub fn latest(&self) -> Option<Arc<SurfaceFrame>> {
        self.state.lock().latest.clone()
    }

    /// Release waiting consumers and refuse further frames
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }
}

/// Destination of rendered frames
pub trait FrameSink: Send {
    /// Present one frame
    ///
    /// # Errors
    ///
    /// A failure ends the presenter that owns this sink
    fn present(&mut self, frame: &SurfaceFrame) -> Result<()>;

    /// Human readable sink name
    fn name(&self) -> &str;
}

/// Logs the geometry of every frame
#[derive(Debug, Default)]
pub struct LogSink {
    presented: u64,
}

impl LogSink {
    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl FrameSink for LogSink {
    fn present(&mut self, frame: &SurfaceFrame) -> Result<()> {
        self.presented += 1;
        debug!(
            "[{}] frame {} {}x{}",
            frame.surface,
            frame.sequence,
            frame.image.width(),
            frame.image.height()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Writes every `every`-th frame as PNG into a directory
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    every: u64,
    written: u64,
}

impl PngSink {
    /// Create the sink, creating `dir` if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>, every: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            every: every.max(1),
            written: 0,
        })
    }

    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    fn path_for(&self, frame: &SurfaceFrame) -> PathBuf {
        self.dir.join(format!("{}_{:06}.png", frame.surface, frame.sequence))
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, frame: &SurfaceFrame) -> Result<()> {
        if frame.sequence % self.every != 0 {
            return Ok(());
        }
        let path = self.path_for(frame);
        frame.image.save(&path)?;
        self.written += 1;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "png"
    }
}

/// Run `sink` on its own thread, fed by `slot` until the slot closes
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned
pub fn spawn_presenter(
    surface: Surface,
    slot: Arc<FrameSlot>,
    mut sink: Box<dyn FrameSink>,
) -> Result<JoinHandle<u64>> {
    thread::Builder::new()
        .name(format!("present-{surface}"))
        .spawn(move || {
            info!("Presenter for {surface} started with {} sink", sink.name());
            let mut last = 0;
            let mut presented = 0;
            while let Some(frame) = slot.wait_newer(last) {
                if frame.sequence > last + 1 && last != 0 {
                    debug!("[{surface}] skipped {} frames", frame.sequence - last - 1);
                }
                last = frame.sequence;
                if let Err(e) = sink.present(&frame) {
                    warn!("Presenter for {surface} stopped: {e}");
                    return presented;
                }
                presented += 1;
            }
            info!("Presenter for {surface} finished after {presented} frames");
            presented
        })
        .map_err(|e| Error::Presenter(format!("Failed to start presenter for {surface}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame(sequence: u64) -> SurfaceFrame {
        SurfaceFrame {
            surface: Surface::LeftMirror,
            sequence,
            image: RgbImage::new(4, 2),
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn present(&mut self, _frame: &SurfaceFrame) -> Result<()> {
            Err(Error::Presenter("display unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_publish_overwrites_unconsumed_frame() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.publish(frame(2));
        assert_eq!(slot.wait_newer(0).map(|f| f.sequence), Some(2));
        assert_eq!(slot.latest().map(|f| f.sequence), Some(2));
    }

    #[test]
    fn test_close_wakes_waiter() {
        let slot = Arc::new(FrameSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait_newer(0).is_none())
        };
        thread::sleep(Duration::from_millis(20));
        slot.close();
        assert!(waiter.join().unwrap());

        slot.publish(frame(5));
        assert!(slot.latest().is_none());
    }

    #[test]
    fn test_presenter_drains_until_closed() {
        let slot = Arc::new(FrameSlot::new());
        let handle = spawn_presenter(Surface::LeftMirror, Arc::clone(&slot), Box::new(LogSink::default())).unwrap();

        slot.publish(frame(1));
        thread::sleep(Duration::from_millis(20));
        slot.close();
        assert_eq!(handle.join().unwrap(), 1);
    }

    #[test]
    fn test_sink_failure_ends_presenter_only() {
        let slot = Arc::new(FrameSlot::new());
        let handle = spawn_presenter(Surface::RightMirror, Arc::clone(&slot), Box::new(FailingSink)).unwrap();
        slot.publish(frame(1));
        assert_eq!(handle.join().unwrap(), 0);

        // Producer side keeps working
        slot.publish(frame(2));
        assert_eq!(slot.latest().map(|f| f.sequence), Some(2));
    }

    #[test]
    fn test_png_sink_writes_every_nth() {
        let dir = std::env::temp_dir().join(format!("smart-mirror-png-{}", std::process::id()));
        let mut sink = PngSink::new(&dir, 2).unwrap();
        for sequence in 1..=4 {
            sink.present(&frame(sequence)).unwrap();
        }
        assert_eq!(sink.written(), 2);
        assert!(dir.join("left_000002.png").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
