//! Head pose stream tests over real sockets


use parking_lot::Mutex;
use smart_mirror::{
    app::spawn_receiver,
    constants::{DEFAULT_MAX_PAYLOAD_BYTES, HEAD_POSE_MESSAGE_TAG},
    gaze::GazeState,
    mirror::MirrorCore,
    wire::{encode_message, read_message, read_observation},
    Error, Result,
};
use std::io::{Cursor, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use test_helpers::{head_pose_bytes, plain_config};

#[test]
fn test_stream_of_messages() -> Result<()> {
    let mut stream = Vec::new();
    stream.extend(head_pose_bytes([0.1, 0.2, 0.3], &["LeftMirror"])?);
    stream.extend(encode_message(0xDEAD_BEEF, b"ignored")?);
    stream.extend(head_pose_bytes([0.0, 0.0, 0.0], &[])?);

    let mut reader = Cursor::new(stream);
    let first = read_observation(&mut reader, HEAD_POSE_MESSAGE_TAG, DEFAULT_MAX_PAYLOAD_BYTES)?;
    assert!(first.flags.left_mirror && !first.flags.right_mirror);

    let second = read_observation(&mut reader, HEAD_POSE_MESSAGE_TAG, DEFAULT_MAX_PAYLOAD_BYTES)?;
    assert!(!second.flags.any());

    // Clean end of stream surfaces as an I/O error
    let end = read_observation(&mut reader, HEAD_POSE_MESSAGE_TAG, DEFAULT_MAX_PAYLOAD_BYTES);
    assert!(matches!(end, Err(Error::Io(_))));
    Ok(())
}

#[test]
fn test_payload_split_across_reads() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;
    let bytes = head_pose_bytes([0.05, -0.05, 0.0], &["RightMirror"])?;

    let writer = thread::spawn(move || -> std::io::Result<()> {
        let (mut socket, _) = listener.accept()?;
        for chunk in bytes.chunks(3) {
            socket.write_all(chunk)?;
            socket.flush()?;
        }
        Ok(())
    });

    let mut stream = TcpStream::connect(address)?;
    let message = read_message(&mut stream, DEFAULT_MAX_PAYLOAD_BYTES)?;
    assert_eq!(message.header.tag, HEAD_POSE_MESSAGE_TAG);
    assert_eq!(message.payload.len() as u32, message.header.length);
    writer.join().ok();
    Ok(())
}

#[test]
fn test_receiver_feeds_core_until_disconnect() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;

    let mut bytes = Vec::new();
    for _ in 0..5 {
        bytes.extend(head_pose_bytes([0.01, 0.02, 0.03], &["LeftMirror", "RightMirror"])?);
    }
    // Truncated trailing message
    bytes.extend_from_slice(&[0x00, 0xEE, 0xFF]);

    let writer = thread::spawn(move || -> std::io::Result<()> {
        let (mut socket, _) = listener.accept()?;
        socket.write_all(&bytes)?;
        Ok(())
    });

    let core = Arc::new(Mutex::new(MirrorCore::new(&plain_config(), Instant::now())?));
    let stream = TcpStream::connect(address)?;
    let handle = spawn_receiver(stream, Arc::clone(&core), HEAD_POSE_MESSAGE_TAG, DEFAULT_MAX_PAYLOAD_BYTES)?;

    writer.join().ok();
    let received = handle.join().unwrap_or(0);
    assert_eq!(received, 5);
    assert_eq!(core.lock().state(), GazeState::Tracking);
    Ok(())
}
