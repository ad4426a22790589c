//! Telemetry frame parsing
//!
//! Stream frame format: `[0x13] [N] [payload: N bytes] [checksum]` where the
//! payload is a sequence of (sensor id, value) pairs and the checksum makes
//! the whole frame sum to zero mod 256.
//!
//! The parser is a pure function over a byte slice. It returns what it found
//! together with how many bytes the caller should discard, so the caller owns
//! the buffer and the parser holds no state.

use super::constants::FRAME_HEADER;
use super::sensors::SensorId;

/// One decoded telemetry update: the (id, raw value) pairs of a single
/// validated frame, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorFrame {
    pub pairs: Vec<(SensorId, i32)>,
}

impl SensorFrame {
    /// Raw value of `id` in this frame, if present.
    pub fn value(&self, id: SensorId) -> Option<i32> {
        self.pairs.iter().find(|(i, _)| *i == id).map(|(_, v)| *v)
    }
}

/// Outcome of one parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameParse {
    /// A validated frame.
    Frame(SensorFrame),
    /// The buffer ends before the frame does; read more bytes and retry.
    /// Not an error.
    NeedMoreData,
    /// Checksum mismatch or an id the width table does not know. The
    /// consumed count already steps one byte past the rejected header so a
    /// retry rescans from the next byte.
    Invalid,
}

/// Try to parse one frame from `buf`.
///
/// Returns the outcome and the number of leading bytes the caller must
/// discard before the next attempt:
/// - `Frame`: bytes before the header plus the whole frame.
/// - `NeedMoreData`: bytes before the header (everything, if no header).
/// - `Invalid`: bytes before the header plus one, resynchronizing past the
///   false or corrupted header.
pub fn parse_frame(buf: &[u8]) -> (FrameParse, usize) {
    let Some(start) = buf.iter().position(|&b| b == FRAME_HEADER) else {
        return (FrameParse::NeedMoreData, buf.len());
    };

    let frame = &buf[start..];
    if frame.len() < 2 {
        return (FrameParse::NeedMoreData, start);
    }

    let payload_len = frame[1] as usize;
    let total_len = 2 + payload_len + 1;
    if frame.len() < total_len {
        return (FrameParse::NeedMoreData, start);
    }

    // Header + length + payload + checksum must sum to 0 mod 256.
    let sum = frame[..total_len]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != 0 {
        log::debug!(
            "Frame checksum mismatch: len={}, residue=0x{:02X}",
            payload_len,
            sum
        );
        return (FrameParse::Invalid, start + 1);
    }

    let payload = &frame[2..2 + payload_len];
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let Some(id) = SensorId::from_u8(payload[i]) else {
            // Width unknown, the rest of the payload cannot be split.
            log::debug!("Unknown sensor id 0x{:02X} in frame", payload[i]);
            return (FrameParse::Invalid, start + 1);
        };
        i += 1;
        let width = id.width();
        if i + width > payload.len() {
            log::debug!("Truncated value for {} in frame", id);
            return (FrameParse::Invalid, start + 1);
        }
        pairs.push((id, id.decode(&payload[i..i + width])));
        i += width;
    }

    (FrameParse::Frame(SensorFrame { pairs }), start + total_len)
}

/// Build a valid wire frame from (id, value) pairs, checksum included.
/// The inverse of [`parse_frame`]; used by tests and stream simulations.
pub fn encode_frame(pairs: &[(SensorId, i32)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (id, value) in pairs {
        payload.push(id.as_u8());
        id.encode_value(*value, &mut payload);
    }
    debug_assert!(payload.len() <= u8::MAX as usize);

    let mut out = Vec::with_capacity(3 + payload.len());
    out.push(FRAME_HEADER);
    out.push(payload.len() as u8);
    out.extend_from_slice(&payload);
    let sum = out.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    out.push(sum.wrapping_neg());
    out
}
