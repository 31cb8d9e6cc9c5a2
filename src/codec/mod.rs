//! Codec module - serialization for structured response payloads.
//!
//! [`MsgPackCodec`] is the collaborator the snapshot adapter hands
//! length-delimited byte ranges to. Schema evolution is its concern, not the
//! RPC layer's.
//!
//! Codecs are marker structs with static methods.

mod msgpack;

pub use msgpack::MsgPackCodec;
