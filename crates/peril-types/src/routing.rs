//! Broker topology names shared by every process.
//!
//! | Exchange | Kind | Routing keys |
//! |---|---|---|
//! | `perilDirect` | direct | `pause` |
//! | `perilTopic` | topic | `army_moves.<user>`, `war.<user>`, `game_logs.<user>` |
//! | `peril_dlx` | fanout | (dead letters from every queue) |

/// Direct exchange carrying the pause/resume broadcast.
pub const EXCHANGE_PERIL_DIRECT: &str = "perilDirect";

/// Topic exchange carrying moves, war declarations, and game logs.
pub const EXCHANGE_PERIL_TOPIC: &str = "perilTopic";

/// Dead-letter exchange attached to every declared queue.
pub const EXCHANGE_PERIL_DLX: &str = "peril_dlx";

/// Queue that retains dead-lettered deliveries for inspection.
pub const QUEUE_PERIL_DLQ: &str = "peril_dlq";

/// Routing key of the pause/resume broadcast.
pub const PAUSE_KEY: &str = "pause";

/// Routing-key prefix for army moves.
pub const ARMY_MOVES_PREFIX: &str = "army_moves";

/// Routing-key prefix for war recognitions.
pub const WAR_RECOGNITIONS_PREFIX: &str = "war";

/// Routing-key prefix for game logs; also the aggregator's queue name.
pub const GAME_LOG_SLUG: &str = "game_logs";

/// `<prefix>.<username>`: the key a player publishes under, and the name
/// of that player's transient queue for the same family.
pub fn player_key(prefix: &str, username: &str) -> String {
    format!("{prefix}.{username}")
}

/// `<prefix>.*`: matches the family for every player.
pub fn wildcard_key(prefix: &str) -> String {
    format!("{prefix}.*")
}
