//! Publish/subscribe engine for the Peril game.
//!
//! This crate turns typed values into AMQP messages and back, and turns a
//! handler's verdict into an acknowledgment decision. It supports exactly
//! the publish / subscribe / acknowledge shape the game uses; it is not a
//! general message-queue library.
//!
//! # Modules
//!
//! - [`connection`] -- The process-wide broker connection
//! - [`topology`] -- Queue declaration, binding, and the dead-letter path
//! - [`codec`] -- JSON and binary wire encodings
//! - [`publish`] -- Fire-and-forget publishing behind the [`Publisher`] trait
//! - [`subscribe`] -- The consume loop and handler dispatch
//! - [`ack`] -- Handler verdicts and transport dispositions
//! - [`supervisor`] -- Out-of-band reporting of worker exits
//! - [`config`] -- YAML configuration shared by the binaries
//! - `memory` -- In-memory transport (`testing` feature)

pub mod ack;
pub mod codec;
pub mod config;
pub mod connection;
pub mod delivery;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod publish;
pub mod subscribe;
pub mod supervisor;
pub mod topology;

pub use ack::{AckType, Disposition};
pub use codec::{Decoder, Encoding};
pub use config::{PerilConfig, SubscriptionConfig};
pub use connection::BrokerConnection;
pub use delivery::Delivery;
pub use error::{AckError, CodecError, PubSubError};
pub use publish::{AmqpPublisher, OutgoingMessage, Publisher, publish, publish_binary, publish_json};
pub use subscribe::{consume, subscribe, subscribe_binary, subscribe_json};
pub use supervisor::{ExitReason, Supervisor, WorkerExit, WorkerReporter};
pub use topology::{QueueBinding, QueueDurability, declare_and_bind, declare_exchanges};
