//! Error types for the pub/sub engine.
//!
//! Transport and declaration failures are fatal to whoever hit them; the
//! engine never reconnects on its own. Codec failures are split by
//! direction because they are handled differently: encode errors go back
//! to the caller, decode errors requeue the delivery.

/// Errors raised by the codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Structured-text encoding or decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding or decoding failed.
    #[error("binary codec error: {0}")]
    Binary(#[from] bincode::Error),
}

/// An ack or nack the transport could not deliver.
#[derive(Debug, thiserror::Error)]
pub enum AckError {
    /// The broker client rejected the frame.
    #[error("broker rejected settlement: {0}")]
    Broker(#[source] Box<lapin::Error>),

    /// The channel the delivery arrived on is gone.
    #[error("channel closed")]
    ChannelClosed,
}

/// Errors raised by the topology manager, publisher, and subscribe engine.
#[derive(Debug, thiserror::Error)]
pub enum PubSubError {
    /// The broker is unreachable or no channel could be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// A queue or exchange could not be declared or bound, typically
    /// because it already exists with conflicting properties.
    #[error("declaration of {name} failed: {reason}")]
    Declaration {
        /// Queue or exchange name.
        name: String,
        /// Broker-reported reason.
        reason: String,
    },

    /// A payload could not be encoded. Nothing was sent.
    #[error("serialization error: {0}")]
    Serialization(#[from] CodecError),

    /// Sending a message or reading the delivery stream failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An ack or nack was rejected by the transport.
    #[error("acknowledgment on {queue} failed: {source}")]
    Acknowledge {
        /// Queue the delivery came from.
        queue: String,
        /// What the transport reported.
        #[source]
        source: AckError,
    },

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}
