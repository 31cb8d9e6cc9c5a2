//! Synchronous RPC invocation and status translation.
//!
//! [`send_recv`] performs one round trip and decodes the fixed response
//! header for the invoked [`Rpc`]. What it returns is an
//! [`UncheckedResponse`]: the only thing readable from it is the status.
//! [`UncheckedResponse::check_status`] turns it into a [`Response`] whose
//! fields and payload are readable, or into the named failure for a non-OK
//! status. Header fields can't be read without the status check.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::protocol::{HeaderFields, ResponseCommon, Rpc, Status, RESPONSE_COMMON_SIZE};
use crate::session::Session;
use crate::snapshot::parse_from_response;

/// A decoded response whose status has not been checked.
pub struct UncheckedResponse<R: Rpc> {
    status: Status,
    fields: R::Response,
    buffer: Bytes,
}

impl<R: Rpc> UncheckedResponse<R> {
    /// The status reported by the coordinator.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Pass through on OK; otherwise fail with the named status.
    pub fn check_status(self) -> Result<Response<R>> {
        self.status.check()?;
        Ok(Response {
            fields: self.fields,
            buffer: self.buffer,
            _rpc: PhantomData,
        })
    }
}

impl<R: Rpc> fmt::Debug for UncheckedResponse<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UncheckedResponse")
            .field("opcode", &R::OPCODE)
            .field("status", &self.status)
            .field("len", &self.buffer.len())
            .finish()
    }
}

/// A successful response.
pub struct Response<R: Rpc> {
    fields: R::Response,
    buffer: Bytes,
    _rpc: PhantomData<R>,
}

impl<R: Rpc> Response<R> {
    /// The operation's fixed response fields.
    pub fn header(&self) -> &R::Response {
        &self.fields
    }

    /// Bytes following the fixed response header.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[R::response_header_size()..]
    }

    /// Decode `length` payload bytes right after the header.
    pub fn parse_payload<T: DeserializeOwned>(&self, length: u32) -> Result<T> {
        parse_from_response(&self.buffer, R::response_header_size(), length)
    }
}

impl<R: Rpc> fmt::Debug for Response<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("opcode", &R::OPCODE)
            .field("header", &self.fields)
            .field("payload_len", &(self.buffer.len() - R::response_header_size()))
            .finish()
    }
}

/// Decode a raw response for `R`.
///
/// # Errors
///
/// [`Error::MalformedResponse`] if `buffer` is shorter than `R`'s fixed
/// response header or echoes a different opcode.
pub fn decode_response<R: Rpc>(buffer: Bytes) -> Result<UncheckedResponse<R>> {
    let needed = R::response_header_size();
    if buffer.len() < needed {
        return Err(Error::MalformedResponse {
            opcode: R::OPCODE,
            reason: format!("{} bytes, header needs {}", buffer.len(), needed),
        });
    }

    // Length checked above; decode cannot come up short.
    let common = ResponseCommon::decode(&buffer).ok_or_else(|| Error::MalformedResponse {
        opcode: R::OPCODE,
        reason: "missing common header".to_string(),
    })?;
    if common.opcode != R::OPCODE as u16 {
        return Err(Error::MalformedResponse {
            opcode: R::OPCODE,
            reason: format!("reply is for opcode {}", common.opcode),
        });
    }

    let fields = <R::Response as HeaderFields>::get(&mut &buffer[RESPONSE_COMMON_SIZE..needed]);
    Ok(UncheckedResponse {
        status: Status::from_wire(common.status),
        fields,
        buffer,
    })
}

/// Send `request` and block for the response to `R`.
///
/// Exactly one request is sent and exactly one response awaited.
pub fn send_recv<R: Rpc, S: Session + ?Sized>(
    session: &mut S,
    request: Bytes,
) -> Result<UncheckedResponse<R>> {
    session.send(request)?;
    let response = session.receive()?;
    decode_response::<R>(response)
}

/// [`send_recv`] followed by the status check.
pub fn call<R: Rpc, S: Session + ?Sized>(session: &mut S, request: Bytes) -> Result<Response<R>> {
    send_recv::<R, S>(session, request)?.check_status()
}
