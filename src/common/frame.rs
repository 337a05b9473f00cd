// src/common/frame.rs

//! CCNET frame codec.
//!
//! Wire layout, both directions:
//! `[start(1)] [address(1)] [length(1)] [command(1)] [payload(0..249)] [crc16 LE(2)]`
//! where `length` counts the whole frame including the checksum. Control
//! responses carry a zero length field and a sentinel byte instead of data.

use arrayvec::ArrayVec;
use core::fmt::Debug;

use super::crc::{calculate_crc16, decode_crc, encode_crc};
use super::error::CcnetError;

/// Start-of-frame marker byte.
pub const START_CODE: u8 = 0x02;
/// Fixed bill-validator address on the serial line.
pub const PERIPHERAL_ADDRESS: u8 = 0x03;

/// Shortest possible frame: header (4 bytes) plus checksum (2 bytes).
pub const MIN_FRAME_LEN: usize = 6;
/// The length field is a single byte, so a frame never exceeds 255 bytes.
pub const MAX_FRAME_LEN: usize = 255;
/// Largest command payload that still fits the length byte.
pub const MAX_COMMAND_PAYLOAD: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// Sentinel byte of a control response acknowledging the last frame.
pub const ACK_SENTINEL: u8 = 0x00;
/// Sentinel byte of a control response rejecting the last frame.
pub const NACK_SENTINEL: u8 = 0xFF;
/// Sentinel byte reporting an unsupported command.
pub const ILLEGAL_COMMAND_SENTINEL: u8 = 0x30;

/// Fixed-capacity buffer holding one complete wire frame.
pub type FrameBuf = ArrayVec<u8, MAX_FRAME_LEN>;

/// Encodes a command frame: header, payload, then the little-endian CRC16
/// of everything emitted so far.
///
/// Fails with `BufferOverflow` if the payload would push the frame length
/// past the single length byte.
pub fn encode<E>(command_code: u8, payload: &[u8]) -> Result<FrameBuf, CcnetError<E>>
where
    E: Debug,
{
    let total = MIN_FRAME_LEN + payload.len();
    if total > MAX_FRAME_LEN {
        return Err(CcnetError::BufferOverflow {
            needed: total,
            got: MAX_FRAME_LEN,
        });
    }

    let mut buf = FrameBuf::new();
    buf.push(START_CODE);
    buf.push(PERIPHERAL_ADDRESS);
    buf.push(total as u8);
    buf.push(command_code);
    // Cannot fail: total <= MAX_FRAME_LEN was checked above.
    let _ = buf.try_extend_from_slice(payload);

    let crc = calculate_crc16(&buf);
    let _ = buf.try_extend_from_slice(&encode_crc(crc));

    Ok(buf)
}

/// A validated inbound frame with the trailing checksum already stripped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    stripped: &'a [u8],
}

/// Outcome of classifying a validated frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameClass<'a> {
    /// Acknowledgment-only control frame; the exchange carries no data.
    Ack,
    /// The peripheral rejected the previous frame.
    Nack,
    /// The peripheral does not support the command.
    IllegalCommand,
    /// A data-bearing response; holds the header-stripped payload.
    Data(&'a [u8]),
}

impl<'a> Frame<'a> {
    /// The checksum-stripped frame bytes, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.stripped
    }

    /// The logical payload: everything after start code, address and length.
    pub fn payload(&self) -> &'a [u8] {
        &self.stripped[3..]
    }

    /// Sorts the frame into ACK / NACK / illegal-command / data.
    ///
    /// A four-byte stripped frame whose last byte is one of the control
    /// sentinels is a control frame; everything else carries data.
    pub fn classify(&self) -> FrameClass<'a> {
        if self.stripped.len() == 4 {
            match self.stripped[3] {
                ACK_SENTINEL => return FrameClass::Ack,
                NACK_SENTINEL => return FrameClass::Nack,
                ILLEGAL_COMMAND_SENTINEL => return FrameClass::IllegalCommand,
                _ => {}
            }
        }
        FrameClass::Data(self.payload())
    }
}

/// Parses and validates one complete inbound frame.
///
/// Checks, in order: minimum length, start code and address, CRC over all
/// bytes preceding the two checksum bytes, and consistency of the length
/// field (it must equal the wire length, or be zero for the fixed 6-byte
/// control frame shape).
pub fn decode<E>(raw: &[u8]) -> Result<Frame<'_>, CcnetError<E>>
where
    E: Debug,
{
    if raw.len() < MIN_FRAME_LEN {
        return Err(CcnetError::Framing);
    }
    if raw[0] != START_CODE || raw[1] != PERIPHERAL_ADDRESS {
        return Err(CcnetError::Framing);
    }

    let crc_start = raw.len() - 2;
    let stripped = &raw[..crc_start];
    let expected = decode_crc(&raw[crc_start..]);
    let calculated = calculate_crc16(stripped);
    if expected != calculated {
        return Err(CcnetError::CrcMismatch { expected, calculated });
    }

    let declared = stripped[2] as usize;
    let length_ok = if declared == 0 {
        // Zero length marks the fixed short control frame; anything longer
        // than its 4 stripped bytes is malformed.
        stripped.len() == 4
    } else {
        declared == raw.len()
    };
    if !length_ok {
        return Err(CcnetError::Framing);
    }

    Ok(Frame { stripped })
}

/// Completion predicate for the response-accumulation loop.
///
/// True once the buffer can be handed to [`decode`]: at least six bytes,
/// and the length field either zero (control frame) or equal to the total
/// buffered count. Pure so it can be tested without any transport.
pub fn response_complete(buf: &[u8]) -> bool {
    if buf.len() < MIN_FRAME_LEN {
        return false;
    }
    let declared = buf[2] as usize;
    declared == 0 || declared == buf.len()
}
