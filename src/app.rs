//! Main application module for the smart mirror.
//!
//! Three kinds of worker cooperate: a receiver thread feeding head pose
//! observations into the shared [`MirrorCore`], the tick loop on the
//! calling thread that advances the core at the display rate and renders a
//! frame per surface, and one presenter thread per surface.

use crate::{
    config::Config,
    constants::{KEEPALIVE_IDLE, KEEPALIVE_INTERVAL, KEEPALIVE_RETRIES},
    mirror::MirrorCore,
    presenter::{spawn_presenter, FrameSink, FrameSlot, LogSink, PngSink, SurfaceFrame},
    scheduler::{FramePace, FrameScheduler},
    utils::image_ops,
    view_window::Surface,
    wire::read_observation,
    Error, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use parking_lot::Mutex;
use socket2::{SockRef, TcpKeepalive};
use std::net::{Shutdown, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Runtime options that are not part of the configuration file
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Override of the configured head pose server address
    pub server: Option<String>,
    /// Skip connecting to a head pose server
    pub offline: bool,
    /// Still image used as the source frame
    pub image: Option<PathBuf>,
    /// Directory receiving PNG dumps of the rendered frames
    pub dump_dir: Option<PathBuf>,
    /// Dump every n-th frame
    pub dump_every: u64,
    /// Stop after this many frames
    pub frames: Option<u64>,
}

/// Where the source frames come from
#[derive(Debug, Clone)]
pub enum FrameSource {
    /// A still image loaded from disk
    Still(RgbImage),
    /// Generated test pattern
    Synthetic(RgbImage),
}

impl FrameSource {
    /// Load a still image
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read or decoded
    pub fn load(path: &std::path::Path) -> Result<Self> {
        info!("Loading source image {}", path.display());
        Ok(Self::Still(image::open(path)?.to_rgb8()))
    }

    /// Test pattern of the given size
    #[must_use]
    pub fn synthetic(width: u32, height: u32) -> Self {
        Self::Synthetic(image_ops::test_pattern(width, height))
    }

    /// Current source frame
    #[must_use]
    pub fn frame(&self) -> &RgbImage {
        match self {
            Self::Still(image) | Self::Synthetic(image) => image,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.frame().dimensions()
    }
}

/// Totals reported when the tick loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub frames: u64,
    pub overruns: u64,
    pub render_failures: u64,
}

struct Receiver {
    stream: TcpStream,
    handle: JoinHandle<u64>,
}

/// Main application struct
pub struct MirrorApp {
    config: Config,
    options: AppOptions,
    core: Arc<Mutex<MirrorCore>>,
    source: FrameSource,
    slots: Vec<(Surface, Arc<FrameSlot>)>,
    presenters: Vec<JoinHandle<u64>>,
    receiver: Option<Receiver>,
}

impl MirrorApp {
    /// Create the application and start its presenters and receiver
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the source image
    /// cannot be loaded, a presenter cannot be started or the head pose
    /// server is unreachable
    pub fn new(config: Config, options: AppOptions) -> Result<Self> {
        info!("Initializing smart mirror application");

        let core = Arc::new(Mutex::new(MirrorCore::new(&config, Instant::now())?));

        let source = match &options.image {
            Some(path) => FrameSource::load(path)?,
            None => {
                info!("No source image, using a synthetic test pattern");
                FrameSource::synthetic(config.display.width, config.display.height)
            }
        };

        let (slots, presenters) = start_presenters(|_| -> Result<Box<dyn FrameSink>> {
            let sink: Box<dyn FrameSink> = match &options.dump_dir {
                Some(dir) => Box::new(PngSink::new(dir, options.dump_every)?),
                None => Box::new(LogSink::default()),
            };
            Ok(sink)
        })?;

        let mut app = Self {
            config,
            options,
            core,
            source,
            slots,
            presenters,
            receiver: None,
        };

        if !app.options.offline {
            app.connect()?;
        }

        Ok(app)
    }

    /// Shared handle to the core, for calibration controls
    #[must_use]
    pub fn core(&self) -> Arc<Mutex<MirrorCore>> {
        Arc::clone(&self.core)
    }

    fn connect(&mut self) -> Result<()> {
        let address = self
            .options
            .server
            .clone()
            .unwrap_or_else(|| self.config.network.address.clone());
        info!("Connecting to head pose server at {address}");

        let stream = TcpStream::connect(&address)?;
        configure_stream(&stream)?;
        let reader = stream.try_clone()?;
        let handle = spawn_receiver(
            reader,
            Arc::clone(&self.core),
            self.config.network.message_tag,
            self.config.network.max_payload_bytes,
        )?;

        self.receiver = Some(Receiver { stream, handle });
        Ok(())
    }

    /// Run the tick loop until the frame limit is reached
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that affect every surface
    pub fn run(&mut self) -> Result<RunStats> {
        info!("Starting tick loop at {} fps", self.config.display.target_fps);

        let mut scheduler = FrameScheduler::new(self.config.display.target_fps, Instant::now());
        let mut stats = RunStats::default();
        let dims = self.source.dimensions();
        let display = (self.config.display.width, self.config.display.height);

        loop {
            if self.options.frames.map_or(false, |limit| stats.frames >= limit) {
                break;
            }

            let frame = self.core.lock().tick(dims);
            stats.frames += 1;

            for (surface, slot) in &self.slots {
                let window = frame.window(*surface);
                match window.render(self.source.frame()) {
                    Ok(image) => slot.publish(SurfaceFrame {
                        surface: *surface,
                        sequence: frame.sequence,
                        image: image_ops::letterbox(&image, display.0, display.1),
                    }),
                    Err(e) => {
                        stats.render_failures += 1;
                        debug!("Failed to render {surface} window {:?}: {e}", window.region());
                    }
                }
            }

            if let FramePace::Overrun(_) = scheduler.wait_next() {
                stats.overruns += 1;
            }
        }

        info!(
            "Tick loop finished: {} frames, {} overruns, {} render failures",
            stats.frames, stats.overruns, stats.render_failures
        );
        Ok(stats)
    }

    /// Stop every worker and wait for it
    pub fn shutdown(&mut self) {
        stop_presenters(&self.slots, self.presenters.drain(..));

        if let Some(receiver) = self.receiver.take() {
            receiver.stream.shutdown(Shutdown::Both).ok();
            match receiver.handle.join() {
                Ok(count) => info!("Receiver stopped after {count} observations"),
                Err(_) => warn!("Receiver thread panicked"),
            }
        }
    }
}

impl Drop for MirrorApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start one presenter per surface with the sink returned by `make_sink`
///
/// On failure the presenters started so far are stopped again.
///
/// # Errors
///
/// Returns the first error from `make_sink` or from spawning a thread
pub fn start_presenters<F>(mut make_sink: F) -> Result<(Vec<(Surface, Arc<FrameSlot>)>, Vec<JoinHandle<u64>>)>
where
    F: FnMut(Surface) -> Result<Box<dyn FrameSink>>,
{
    let mut slots = Vec::with_capacity(Surface::ALL.len());
    let mut presenters = Vec::with_capacity(Surface::ALL.len());
    for surface in Surface::ALL {
        let slot = Arc::new(FrameSlot::new());
        match make_sink(surface).and_then(|sink| spawn_presenter(surface, Arc::clone(&slot), sink)) {
            Ok(handle) => {
                presenters.push(handle);
                slots.push((surface, slot));
            }
            Err(e) => {
                warn!("Failed to start presenter for {surface}: {e}");
                stop_presenters(&slots, presenters);
                return Err(e);
            }
        }
    }
    Ok((slots, presenters))
}

fn stop_presenters(slots: &[(Surface, Arc<FrameSlot>)], presenters: impl IntoIterator<Item = JoinHandle<u64>>) {
    for (_, slot) in slots {
        slot.close();
    }
    for handle in presenters {
        if handle.join().is_err() {
            warn!("Presenter thread panicked");
        }
    }
}

/// Disable Nagle and enable TCP keepalive so a dead tracker link is noticed
///
/// # Errors
///
/// Returns an error if a socket option cannot be set
pub fn configure_stream(stream: &TcpStream) -> Result<()> {
    stream.set_nodelay(true)?;

    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_IDLE)
        .with_interval(KEEPALIVE_INTERVAL);
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    let keepalive = keepalive.with_retries(KEEPALIVE_RETRIES);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)?;
    Ok(())
}

/// Feed observations from `stream` into `core` until the connection fails
///
/// A failed read ends the connection; the core keeps ticking without input.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned
pub fn spawn_receiver(
    mut stream: TcpStream,
    core: Arc<Mutex<MirrorCore>>,
    tag: u32,
    max_payload: u32,
) -> Result<JoinHandle<u64>> {
    thread::Builder::new()
        .name("receiver".to_string())
        .spawn(move || {
            let mut received = 0;
            loop {
                match read_observation(&mut stream, tag, max_payload) {
                    Ok(observation) => {
                        core.lock().observe(observation.position, observation.flags);
                        received += 1;
                    }
                    Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                        info!("Head pose server closed the connection");
                        return received;
                    }
                    Err(e) => {
                        warn!("Head pose connection lost: {e}");
                        return received;
                    }
                }
            }
        })
        .map_err(Error::from)
}
