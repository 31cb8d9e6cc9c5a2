//! MsgPack codec using `rmp-serde`.
//!
//! Structured payloads (server lists, tablet maps) are encoded with
//! `to_vec_named`, so structs travel as maps keyed by field name. Decoders
//! on either side can then skip fields they don't know about, which keeps
//! snapshots readable across coordinator versions.
//!
//! # Example
//!
//! ```
//! use coordinator_client::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Entry {
//!     server_id: u64,
//!     service_locator: String,
//! }
//!
//! let entry = Entry { server_id: 7, service_locator: "tcp: host=a, port=1".to_string() };
//! let encoded = MsgPackCodec::encode(&entry).unwrap();
//! let decoded: Entry = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, entry);
//! ```

use crate::error::Result;

/// MessagePack codec for structured payloads.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (structs as maps).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`](crate::Error::Encode) if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) if the bytes are not a
    /// well-formed encoding of `T`.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
