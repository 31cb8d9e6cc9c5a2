//! Wire format for coordinator RPC headers.
//!
//! Every request starts with a 4-byte common header and every response with
//! a 4-byte common header; the operation's own fixed fields follow, and any
//! variable-length payload comes after those:
//! ```text
//! request:  ┌──────────┬──────────┬─────────────┬──────────────┐
//!           │ Opcode   │ Reserved │ op fields   │ var payload  │
//!           │ u16 LE   │ u16 LE   │ fixed size  │ length in hdr│
//!           └──────────┴──────────┴─────────────┴──────────────┘
//! response: ┌──────────┬──────────┬─────────────┬──────────────┐
//!           │ Opcode   │ Status   │ op fields   │ var payload  │
//!           │ u16 LE   │ u16 LE   │ fixed size  │ length in hdr│
//!           └──────────┴──────────┴─────────────┴──────────────┘
//! ```
//!
//! All multi-byte integers are Little Endian and fields are packed.

use std::fmt;

use bytes::{Buf, BufMut};

use super::status::Status;

/// Size of [`RequestCommon`] in bytes.
pub const REQUEST_COMMON_SIZE: usize = 4;

/// Size of [`ResponseCommon`] in bytes.
pub const RESPONSE_COMMON_SIZE: usize = 4;

/// Byte offset of the status field in every response.
pub const STATUS_OFFSET: usize = 2;

const _: () = assert!(STATUS_OFFSET + 2 <= RESPONSE_COMMON_SIZE);

/// Operation identifiers understood by the coordinator.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Ping = 7,
    CreateTable = 8,
    OpenTable = 9,
    DropTable = 10,
    EnlistServer = 11,
    GetServerList = 12,
    GetTabletMap = 13,
}

impl Opcode {
    /// All opcodes, in wire order.
    pub const ALL: [Opcode; 7] = [
        Opcode::Ping,
        Opcode::CreateTable,
        Opcode::OpenTable,
        Opcode::DropTable,
        Opcode::EnlistServer,
        Opcode::GetServerList,
        Opcode::GetTabletMap,
    ];

    /// Decode an opcode from its wire value.
    pub fn from_wire(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as u16 == value)
    }

    /// Upper-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Ping => "PING",
            Opcode::CreateTable => "CREATE_TABLE",
            Opcode::OpenTable => "OPEN_TABLE",
            Opcode::DropTable => "DROP_TABLE",
            Opcode::EnlistServer => "ENLIST_SERVER",
            Opcode::GetServerList => "GET_SERVER_LIST",
            Opcode::GetTabletMap => "GET_TABLET_MAP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-size, packed group of header fields.
///
/// Implemented once for each operation's request and response fields, and
/// for `()` when an operation has none.
pub trait HeaderFields: Sized + fmt::Debug {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the fields to `buf`.
    fn put(&self, buf: &mut impl BufMut);

    /// Read the fields from the front of `buf`.
    ///
    /// Callers guarantee `buf.remaining() >= Self::SIZE`.
    fn get(buf: &mut impl Buf) -> Self;
}

impl HeaderFields for () {
    const SIZE: usize = 0;

    fn put(&self, _buf: &mut impl BufMut) {}

    fn get(_buf: &mut impl Buf) -> Self {}
}

/// Header shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCommon {
    pub opcode: Opcode,
}

impl RequestCommon {
    /// Encode into `buf`. The reserved half-word is always zero.
    pub fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.opcode as u16);
        buf.put_u16_le(0);
    }

    /// Decode from the front of `buf`.
    ///
    /// Returns `None` if the buffer is too short or the opcode is unknown.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < REQUEST_COMMON_SIZE {
            return None;
        }
        let mut buf = buf;
        let opcode = Opcode::from_wire(buf.get_u16_le())?;
        Some(Self { opcode })
    }
}

/// Header shared by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCommon {
    /// Raw opcode echo; compared against the invoked operation.
    pub opcode: u16,
    /// Raw status code; see [`Status::from_wire`].
    pub status: u16,
}

impl ResponseCommon {
    /// Build the common header of a reply to `opcode`.
    pub fn new(opcode: Opcode, status: Status) -> Self {
        Self {
            opcode: opcode as u16,
            status: status as u16,
        }
    }

    /// Encode into `buf`.
    pub fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.opcode);
        buf.put_u16_le(self.status);
    }

    /// Decode from the front of `buf`. Returns `None` if too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < RESPONSE_COMMON_SIZE {
            return None;
        }
        Some(Self {
            opcode: (&buf[..]).get_u16_le(),
            status: (&buf[STATUS_OFFSET..]).get_u16_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_common_little_endian() {
        let mut buf = Vec::new();
        RequestCommon {
            opcode: Opcode::GetTabletMap,
        }
        .put(&mut buf);
        assert_eq!(buf, vec![13, 0, 0, 0]);
    }

    #[test]
    fn test_status_at_fixed_offset() {
        let mut buf = Vec::new();
        ResponseCommon::new(Opcode::OpenTable, Status::NoTableSpace).put(&mut buf);
        assert_eq!(buf.len(), RESPONSE_COMMON_SIZE);
        assert_eq!(buf[STATUS_OFFSET], Status::NoTableSpace as u8);
        assert_eq!(buf[STATUS_OFFSET + 1], 0);
    }

    #[test]
    fn test_status_decoded_from_fixed_offset() {
        let mut raw = [0u8; RESPONSE_COMMON_SIZE];
        raw[..2].copy_from_slice(&(Opcode::DropTable as u16).to_le_bytes());
        raw[STATUS_OFFSET..STATUS_OFFSET + 2]
            .copy_from_slice(&(Status::ServiceNotAvailable as u16).to_le_bytes());
        let common = ResponseCommon::decode(&raw).unwrap();
        assert_eq!(common, ResponseCommon::new(Opcode::DropTable, Status::ServiceNotAvailable));
    }

    #[test]
    fn test_response_common_too_short() {
        assert!(ResponseCommon::decode(&[9, 0, 0]).is_none());
        let common = ResponseCommon::decode(&[9, 0, 1, 0]).unwrap();
        assert_eq!(common.opcode, Opcode::OpenTable as u16);
        assert_eq!(common.status, 1);
    }

    #[test]
    fn test_opcode_from_wire() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_wire(op as u16), Some(op));
        }
        assert_eq!(Opcode::from_wire(0), None);
        assert_eq!(Opcode::from_wire(14), None);
    }

    #[test]
    fn test_request_common_rejects_unknown_opcode() {
        assert!(RequestCommon::decode(&[0xFF, 0xFF, 0, 0]).is_none());
        assert!(RequestCommon::decode(&[7, 0]).is_none());
        assert_eq!(
            RequestCommon::decode(&[7, 0, 0, 0]).map(|c| c.opcode),
            Some(Opcode::Ping)
        );
    }
}
