//! Wire encodings.
//!
//! The encoding is a property of the message type, fixed at the call
//! site that publishes or subscribes it:
//!
//! - [`Encoding::Json`] for moves, war recognitions, and pause control.
//! - [`Encoding::Binary`] for game logs, whose timestamps must round-trip
//!   exactly and which have no outside consumers.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

/// Signature of a payload decoder handed to the subscribe engine.
pub type Decoder<T> = fn(&[u8]) -> Result<T, CodecError>;

/// One of the two supported wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Structured text (`serde_json`).
    Json,
    /// Compact binary (`bincode`).
    Binary,
}

impl Encoding {
    /// AMQP `content-type` property for messages in this encoding.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Binary => "application/octet-stream",
        }
    }

    /// Encode `value`.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => Ok(serde_json::to_vec(value)?),
            Self::Binary => Ok(bincode::serialize(value)?),
        }
    }

    /// Decode a `T` from `body`.
    pub fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => decode_json(body),
            Self::Binary => decode_binary(body),
        }
    }
}

/// [`Decoder`] for [`Encoding::Json`].
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, CodecError> {
    Ok(serde_json::from_slice(body)?)
}

/// [`Decoder`] for [`Encoding::Binary`].
pub fn decode_binary<T: DeserializeOwned>(body: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(body)?)
}
