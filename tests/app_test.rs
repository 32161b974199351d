//! Application wiring: tick loop, presenters and receiver together


use image::{Rgb, RgbImage};
use smart_mirror::{
    app::{configure_stream, start_presenters, AppOptions, MirrorApp},
    config::Config,
    gaze::GazeState,
    presenter::{FrameSink, LogSink},
    view_window::Surface,
    Error, Result,
};
use socket2::SockRef;
use std::io::Write;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use test_helpers::head_pose_bytes;

fn small_config() -> Config {
    let mut config = Config::default();
    config.display.width = 320;
    config.display.height = 180;
    config.display.target_fps = 200;
    config
}

#[test]
fn test_offline_run_produces_frames() -> Result<()> {
    let options = AppOptions {
        offline: true,
        frames: Some(5),
        ..AppOptions::default()
    };
    let mut app = MirrorApp::new(small_config(), options)?;
    let stats = app.run()?;
    app.shutdown();

    assert_eq!(stats.frames, 5);
    assert_eq!(stats.render_failures, 0);
    Ok(())
}

#[test]
fn test_run_dumps_png_frames() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("smart-mirror-app-{}", std::process::id()));
    let options = AppOptions {
        offline: true,
        frames: Some(2),
        dump_dir: Some(dir.clone()),
        dump_every: 1,
        ..AppOptions::default()
    };
    let mut app = MirrorApp::new(small_config(), options)?;
    app.run()?;
    app.shutdown();

    let written = std::fs::read_dir(&dir)?.count();
    std::fs::remove_dir_all(&dir).ok();
    // Presenters may skip frames, but each surface shows at least one
    assert!(written >= 3, "only {written} frames written");
    Ok(())
}

#[test]
fn test_connected_run_tracks_viewer() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?.to_string();
    let bytes = head_pose_bytes([0.0, 0.0, 0.0], &["LeftMirror"])?;

    let server = thread::spawn(move || -> std::io::Result<()> {
        let (mut socket, _) = listener.accept()?;
        socket.write_all(&bytes)?;
        // Keep the connection open while the client ticks
        thread::sleep(Duration::from_millis(200));
        Ok(())
    });

    let options = AppOptions {
        server: Some(address),
        frames: Some(1),
        ..AppOptions::default()
    };
    let mut app = MirrorApp::new(small_config(), options)?;

    let core = app.core();
    let mut tracking = false;
    for _ in 0..50 {
        if core.lock().state() == GazeState::Tracking {
            tracking = true;
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    app.run()?;
    app.shutdown();
    server.join().ok();

    assert!(tracking);
    Ok(())
}

#[test]
fn test_frames_letterboxed_to_display() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("smart-mirror-letterbox-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let source = dir.join("square.png");
    RgbImage::from_pixel(100, 100, Rgb([200, 200, 200])).save(&source)?;

    let frames = dir.join("frames");
    let options = AppOptions {
        offline: true,
        frames: Some(2),
        image: Some(source),
        dump_dir: Some(frames.clone()),
        dump_every: 1,
        ..AppOptions::default()
    };
    let mut app = MirrorApp::new(small_config(), options)?;
    app.run()?;
    app.shutdown();

    let windshield = std::fs::read_dir(&frames)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .find(|path| path.file_name().map_or(false, |name| name.to_string_lossy().starts_with("windshield_")));
    let image = image::open(windshield.expect("windshield frame written"))?.to_rgb8();
    std::fs::remove_dir_all(&dir).ok();

    // Square source centred on the 16:9 display with black bars
    assert_eq!(image.dimensions(), (320, 180));
    assert_eq!(*image.get_pixel(0, 90), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(160, 90), Rgb([200, 200, 200]));
    Ok(())
}

#[test]
fn test_failed_sink_stops_started_presenters() {
    let result = start_presenters(|surface| -> Result<Box<dyn FrameSink>> {
        if surface == Surface::RightMirror {
            return Err(Error::Presenter("no display".to_string()));
        }
        Ok(Box::new(LogSink::default()))
    });
    // Returning at all means the presenters already started were joined
    assert!(matches!(result, Err(Error::Presenter(_))));
}

#[test]
fn test_stream_uses_keepalive() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let stream = std::net::TcpStream::connect(listener.local_addr()?)?;
    configure_stream(&stream)?;

    let socket = SockRef::from(&stream);
    assert!(socket.keepalive()?);
    assert!(stream.nodelay()?);
    Ok(())
}
