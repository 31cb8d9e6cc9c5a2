//! Append-only request construction.
//!
//! A [`RequestBuffer`] starts with the fixed header of one RPC and grows by
//! appending variable-length fields behind it. There is a single write
//! cursor (the end of the buffer); nothing already written is read back.
//!
//! # Example
//!
//! ```
//! use coordinator_client::protocol::{OpenTableRpc, RequestBuffer, TableNameRequest, c_str_len};
//!
//! let name = "users";
//! let req = RequestBuffer::new::<OpenTableRpc>(&TableNameRequest {
//!     name_length: c_str_len(name),
//! })
//! .append_c_str(name)
//! .freeze();
//! assert_eq!(req.len(), 8 + 6);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::rpcs::Rpc;
use super::wire_format::{HeaderFields, RequestCommon};

/// Bytes of `s` sent on the wire: everything before the first NUL.
fn c_str_bytes(s: &str) -> &[u8] {
    let bytes = s.as_bytes();
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Wire length of `s` as a NUL-terminated string, terminator included.
pub fn c_str_len(s: &str) -> u32 {
    (c_str_bytes(s).len() + 1) as u32
}

/// Outgoing request under construction.
#[derive(Debug)]
pub struct RequestBuffer {
    buf: BytesMut,
}

impl RequestBuffer {
    /// Start a request for `R`, writing its common and fixed headers.
    ///
    /// Length fields in `fields` must already describe whatever will be
    /// appended afterwards.
    pub fn new<R: Rpc>(fields: &R::Request) -> Self {
        let mut buf = BytesMut::with_capacity(R::request_header_size());
        RequestCommon { opcode: R::OPCODE }.put(&mut buf);
        fields.put(&mut buf);
        Self { buf }
    }

    /// Reserve `n` zeroed bytes at the cursor and return them for writing.
    pub fn reserve(&mut self, n: usize) -> &mut [u8] {
        let start = self.buf.len();
        self.buf.put_bytes(0, n);
        &mut self.buf[start..]
    }

    /// Append raw bytes.
    pub fn append(mut self, data: &[u8]) -> Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Append `s` as a NUL-terminated string of [`c_str_len`] bytes.
    pub fn append_c_str(mut self, s: &str) -> Self {
        let bytes = c_str_bytes(s);
        let slot = self.reserve(bytes.len() + 1);
        slot[..bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always false once constructed; every request carries a header.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish construction.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
