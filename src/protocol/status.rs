//! Status codes carried in every response header.
//!
//! The set is closed and versioned together with the coordinator. A value
//! this client does not recognize is treated as [`Status::InternalError`].

use thiserror::Error;

use crate::error::{Error as RpcError, Result};

/// Outcome of an RPC as reported by the coordinator.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Status {
    #[error("status OK")]
    Ok = 0,
    #[error("table doesn't exist")]
    TableDoesntExist = 1,
    #[error("object doesn't exist")]
    ObjectDoesntExist = 2,
    #[error("object already exists")]
    ObjectExists = 3,
    #[error("wrong version")]
    WrongVersion = 4,
    #[error("no table space left")]
    NoTableSpace = 5,
    #[error("message too short")]
    MessageTooShort = 6,
    #[error("unimplemented request")]
    UnimplementedRequest = 7,
    #[error("request format error")]
    RequestFormatError = 8,
    #[error("response format error")]
    ResponseFormatError = 9,
    #[error("couldn't connect")]
    CouldntConnect = 10,
    #[error("retry")]
    Retry = 11,
    #[error("service not available")]
    ServiceNotAvailable = 12,
    #[error("internal error")]
    InternalError = 13,
}

impl Status {
    /// Every defined status, in wire order.
    pub const ALL: [Status; 14] = [
        Status::Ok,
        Status::TableDoesntExist,
        Status::ObjectDoesntExist,
        Status::ObjectExists,
        Status::WrongVersion,
        Status::NoTableSpace,
        Status::MessageTooShort,
        Status::UnimplementedRequest,
        Status::RequestFormatError,
        Status::ResponseFormatError,
        Status::CouldntConnect,
        Status::Retry,
        Status::ServiceNotAvailable,
        Status::InternalError,
    ];

    /// Map a raw status code; unknown values become `InternalError`.
    pub fn from_wire(value: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| *status as u16 == value)
            .unwrap_or(Status::InternalError)
    }

    /// Whether this is [`Status::Ok`].
    #[inline]
    pub fn is_ok(&self) -> bool {
        *self == Status::Ok
    }

    /// `Ok(())` for [`Status::Ok`], otherwise the named failure.
    pub fn check(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(RpcError::Status(self))
        }
    }
}
