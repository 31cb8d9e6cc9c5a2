//! Stream framing for [`StreamSession`](super::StreamSession).
//!
//! Each RPC request or response travels in one frame with a 9-byte header:
//! ```text
//! ┌───────┬──────────┬──────────┐
//! │ Flags │ Req ID   │ Length   │
//! │ 1 byte│ uint32 BE│ uint32 BE│
//! └───────┴──────────┴──────────┘
//! ```
//!
//! The frame body is the RPC message verbatim (its own headers are
//! little-endian and opaque at this layer).

use bytes::{Bytes, BytesMut};

use crate::error::TransportError;

/// Frame header size in bytes (fixed, exactly 9).
pub const FRAME_HEADER_SIZE: usize = 9;

/// Default maximum frame payload (64 MB).
pub const DEFAULT_MAX_FRAME_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Flag constants.
pub mod flags {
    /// Frame carries a response (1) or a request (0).
    pub const IS_RESPONSE: u8 = 0b0000_0001;

    /// Reserved bits mask.
    pub const RESERVED_MASK: u8 = 0b1111_1110;

    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: u8,
    /// Matches a response to the request that caused it.
    pub request_id: u32,
    pub payload_length: u32,
}

impl FrameHeader {
    pub fn new(flags: u8, request_id: u32, payload_length: u32) -> Self {
        Self {
            flags,
            request_id,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut buf = [0u8; FRAME_HEADER_SIZE];
        buf[0] = self.flags;
        buf[1..5].copy_from_slice(&self.request_id.to_be_bytes());
        buf[5..9].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes. Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return None;
        }
        Some(Self {
            flags: buf[0],
            request_id: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
            payload_length: u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]),
        })
    }

    /// Check reserved bits and payload size.
    pub fn validate(&self, max_payload: u32) -> Result<(), TransportError> {
        if self.flags & flags::RESERVED_MASK != 0 {
            return Err(TransportError::Protocol(format!(
                "reserved flag bits set: {:#04x}",
                self.flags
            )));
        }
        if self.payload_length > max_payload {
            return Err(TransportError::Protocol(format!(
                "payload size {} exceeds maximum {}",
                self.payload_length, max_payload
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        flags::has_flag(self.flags, flags::IS_RESPONSE)
    }
}

/// A complete frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

/// Build a complete frame as a single byte vector.
pub fn build_frame(header: &FrameHeader, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

#[derive(Debug, Clone)]
enum State {
    WaitingForHeader,
    WaitingForPayload { header: FrameHeader },
}

/// Accumulates stream reads and yields complete frames.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    max_payload: u32,
}

impl FrameBuffer {
    pub fn new(max_payload: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForHeader,
            max_payload,
        }
    }

    /// Push data and extract every frame it completes.
    ///
    /// # Errors
    ///
    /// [`TransportError::Protocol`] if a header is invalid. The buffer is
    /// unusable afterwards and should be cleared with the connection.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>, TransportError> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn try_extract_one(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.state {
                State::WaitingForHeader => {
                    let Some(header) = FrameHeader::decode(&self.buffer) else {
                        return Ok(None);
                    };
                    header.validate(self.max_payload)?;
                    let _ = self.buffer.split_to(FRAME_HEADER_SIZE);
                    self.state = State::WaitingForPayload { header };
                }
                State::WaitingForPayload { header } => {
                    let remaining = header.payload_length as usize;
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }
                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForHeader;
                    return Ok(Some(Frame { header, payload }));
                }
            }
        }
    }

    /// Number of buffered, not yet framed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop buffered bytes and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }
}
