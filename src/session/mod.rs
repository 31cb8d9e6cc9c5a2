//! Session module - the channel RPCs travel over.
//!
//! A [`Session`] carries one request and then one response, blocking the
//! caller for each. The RPC layer never opens, pools, or multiplexes
//! sessions; it borrows whatever the caller hands it.
//!
//! - [`StreamSession`]: TCP / Unix-domain implementation
//! - [`ServiceLocator`]: `protocol: key=value, ...` address strings
//! - [`SessionConfig`]: timeouts and size limits

mod config;
mod frame;
mod locator;
mod stream;

use bytes::Bytes;

use crate::error::TransportError;

pub use config::{SessionConfig, DEFAULT_CONNECT_TIMEOUT_MS};
pub use frame::{
    build_frame, flags, Frame, FrameBuffer, FrameHeader, DEFAULT_MAX_FRAME_PAYLOAD,
    FRAME_HEADER_SIZE,
};
pub use locator::ServiceLocator;
pub use stream::StreamSession;

/// A blocking request/response channel to one coordinator.
///
/// Not safe for concurrent use; callers sharing a session across threads
/// must serialize access themselves.
pub trait Session {
    /// Deliver a complete request.
    fn send(&mut self, request: Bytes) -> Result<(), TransportError>;

    /// Block until the response to the last request arrives.
    fn receive(&mut self) -> Result<Bytes, TransportError>;
}

impl<S: Session + ?Sized> Session for &mut S {
    fn send(&mut self, request: Bytes) -> Result<(), TransportError> {
        (**self).send(request)
    }

    fn receive(&mut self) -> Result<Bytes, TransportError> {
        (**self).receive()
    }
}

impl<S: Session + ?Sized> Session for Box<S> {
    fn send(&mut self, request: Bytes) -> Result<(), TransportError> {
        (**self).send(request)
    }

    fn receive(&mut self) -> Result<Bytes, TransportError> {
        (**self).receive()
    }
}
