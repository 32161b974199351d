//! Framing and decoding of the head pose stream.
//!
//! Every message starts with an 8-byte header made of two little-endian
//! `u32` values, the message tag and the payload length, followed by
//! exactly that many payload bytes. Head pose payloads are msgpack maps:
//!
//! ```text
//! { "headPose": { "position": [x, y, z] },
//!   "viewingTargetsInfo": { "targets": [ { "name": "LeftMirror" }, ... ] } }
//! ```

use crate::{
    axis::AlignmentVector,
    constants::{MESSAGE_HEADER_SIZE, POSITION_DECIMALS},
    gaze::{GazeObservation, ViewingFlags},
    utils::round_to_decimals,
    Error, Result,
};
use log::trace;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Name of the left mirror viewing target
pub const LEFT_MIRROR_TARGET: &str = "LeftMirror";

/// Name of the right mirror viewing target
pub const RIGHT_MIRROR_TARGET: &str = "RightMirror";

/// Fixed message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub tag: u32,
    pub length: u32,
}

impl MessageHeader {
    /// Decode from the 8 header bytes
    #[must_use]
    pub fn decode(bytes: &[u8; MESSAGE_HEADER_SIZE]) -> Self {
        let [t0, t1, t2, t3, l0, l1, l2, l3] = *bytes;
        Self {
            tag: u32::from_le_bytes([t0, t1, t2, t3]),
            length: u32::from_le_bytes([l0, l1, l2, l3]),
        }
    }

    /// Encode to the 8 header bytes
    #[must_use]
    pub fn encode(&self) -> [u8; MESSAGE_HEADER_SIZE] {
        let mut bytes = [0u8; MESSAGE_HEADER_SIZE];
        bytes[..4].copy_from_slice(&self.tag.to_le_bytes());
        bytes[4..].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }
}

/// One framed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

/// Read exactly one message from `reader`
///
/// # Errors
///
/// An end of stream or short read anywhere in the message is an error; the
/// connection cannot be resynchronised afterwards. Payloads longer than
/// `max_payload` are rejected before reading them.
pub fn read_message<R: Read>(reader: &mut R, max_payload: u32) -> Result<Message> {
    let mut header_bytes = [0u8; MESSAGE_HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;
    let header = MessageHeader::decode(&header_bytes);

    if header.length > max_payload {
        return Err(Error::Wire(format!(
            "Payload of {} bytes exceeds limit of {max_payload}",
            header.length
        )));
    }

    let length = usize::try_from(header.length)
        .map_err(|_| Error::Wire(format!("Payload length {} not addressable", header.length)))?;
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;

    trace!("Read message tag {:#010x}, {} bytes", header.tag, header.length);
    Ok(Message { header, payload })
}

/// Frame `payload` under `tag`
///
/// # Errors
///
/// Returns an error if the payload length does not fit in a `u32`
pub fn encode_message(tag: u32, payload: &[u8]) -> Result<Vec<u8>> {
    let length = u32::try_from(payload.len())
        .map_err(|_| Error::Wire(format!("Payload of {} bytes too large to frame", payload.len())))?;
    let mut bytes = MessageHeader { tag, length }.encode().to_vec();
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// Head pose message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadPoseMessage {
    pub head_pose: HeadPose,
    #[serde(default)]
    pub viewing_targets_info: ViewingTargetsInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewingTargetsInfo {
    #[serde(default)]
    pub targets: Vec<ViewingTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingTarget {
    #[serde(default)]
    pub name: String,
}

impl HeadPoseMessage {
    /// Decode a msgpack payload
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid head pose map
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(payload)?)
    }

    /// Encode as a msgpack map
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::Wire(format!("Failed to encode head pose: {e}")))
    }

    /// Viewing flags derived from the target names
    #[must_use]
    pub fn flags(&self) -> ViewingFlags {
        self.viewing_targets_info
            .targets
            .iter()
            .fold(ViewingFlags::NONE, |mut flags, target| {
                match target.name.as_str() {
                    LEFT_MIRROR_TARGET => flags.left_mirror = true,
                    RIGHT_MIRROR_TARGET => flags.right_mirror = true,
                    _ => flags.other_target = true,
                }
                flags
            })
    }

    /// Observation with the position rounded to centimetres
    #[must_use]
    pub fn to_observation(&self) -> GazeObservation {
        let [x, y, z] = self.head_pose.position.map(|v| round_to_decimals(v, POSITION_DECIMALS));
        GazeObservation::new(AlignmentVector::new(x, y, z), self.flags())
    }
}

/// Read messages until one with `tag` and a non-empty payload arrives
///
/// # Errors
///
/// Propagates read and decode failures
pub fn read_observation<R: Read>(reader: &mut R, tag: u32, max_payload: u32) -> Result<GazeObservation> {
    loop {
        let message = read_message(reader, max_payload)?;
        if message.header.tag != tag || message.payload.is_empty() {
            trace!("Skipping message tag {:#010x}", message.header.tag);
            continue;
        }
        return Ok(HeadPoseMessage::decode(&message.payload)?.to_observation());
    }
}
