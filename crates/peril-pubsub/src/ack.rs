//! Handler verdicts and the transport actions they map to.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a handler wants done with the delivery it was given.
///
/// This is the only vocabulary a handler has for talking to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    /// The event was fully applied.
    Ack,
    /// Transient or ordering-dependent failure: deliver again.
    NackRequeue,
    /// The event is permanently inapplicable: dead-letter it.
    NackDiscard,
}

impl AckType {
    /// Numeric verdict code, for transports or tooling that carry verdicts
    /// as integers.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ack => 0,
            Self::NackRequeue => 1,
            Self::NackDiscard => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ack),
            1 => Some(Self::NackRequeue),
            2 => Some(Self::NackDiscard),
            _ => None,
        }
    }
}

/// The acknowledgment actually sent to the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Positive acknowledgment.
    Ack,
    /// Negative acknowledgment with requeue.
    Requeue,
    /// Negative acknowledgment without requeue; the broker routes the
    /// message to the queue's dead-letter exchange.
    DeadLetter,
}

impl From<AckType> for Disposition {
    fn from(verdict: AckType) -> Self {
        match verdict {
            AckType::Ack => Self::Ack,
            AckType::NackRequeue => Self::Requeue,
            AckType::NackDiscard => Self::DeadLetter,
        }
    }
}

impl Disposition {
    /// Map a raw verdict code. Unknown codes are dead-lettered and logged.
    pub fn from_code(code: u8) -> Self {
        AckType::from_code(code).map_or_else(
            || {
                warn!(code, "unknown ack verdict, discarding message");
                Self::DeadLetter
            },
            Self::from,
        )
    }

    /// `requeue` flag for a negative acknowledgment, `None` for an ack.
    pub const fn requeue(self) -> Option<bool> {
        match self {
            Self::Ack => None,
            Self::Requeue => Some(true),
            Self::DeadLetter => Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_verdict_maps_to_one_action() {
        assert_eq!(Disposition::from(AckType::Ack), Disposition::Ack);
        assert_eq!(
            Disposition::from(AckType::NackRequeue),
            Disposition::Requeue
        );
        assert_eq!(
            Disposition::from(AckType::NackDiscard),
            Disposition::DeadLetter
        );
    }

    #[test]
    fn codes_round_trip() {
        for verdict in [AckType::Ack, AckType::NackRequeue, AckType::NackDiscard] {
            assert_eq!(AckType::from_code(verdict.code()), Some(verdict));
            assert_eq!(
                Disposition::from_code(verdict.code()),
                Disposition::from(verdict)
            );
        }
    }

    #[test]
    fn out_of_range_code_is_dead_lettered() {
        assert_eq!(AckType::from_code(3), None);
        assert_eq!(Disposition::from_code(3), Disposition::DeadLetter);
        assert_eq!(Disposition::from_code(u8::MAX), Disposition::DeadLetter);
    }

    #[test]
    fn requeue_flags() {
        assert_eq!(Disposition::Ack.requeue(), None);
        assert_eq!(Disposition::Requeue.requeue(), Some(true));
        assert_eq!(Disposition::DeadLetter.requeue(), Some(false));
    }
}
