//! Junk game logs for load-testing the log aggregator.

use std::iter;

use peril_types::GameLog;
use rand::seq::IndexedRandom;

const WAR_QUOTES: [&str; 6] = [
    "Never interrupt your enemy when he is making a mistake.",
    "The hardest thing of all for a soldier is to retreat.",
    "A soldier will fight long and hard for a bit of colored ribbon.",
    "It is well that war is so terrible, otherwise we should grow too fond of it.",
    "The art of war is simple enough. Find out where your enemy is. Get at him as soon as you can. Strike him as hard as you can, and keep moving on.",
    "All warfare is based on deception.",
];

/// A log line quoting a random war maxim.
pub fn malicious_log(username: &str) -> GameLog {
    let quote = WAR_QUOTES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or_default();
    GameLog::now(username, quote)
}

/// `count` spam logs written by `username`, built one at a time as the
/// iterator is driven.
pub fn spam_logs(username: &str, count: usize) -> impl Iterator<Item = GameLog> {
    iter::repeat_with(move || malicious_log(username)).take(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spam_logs_quote_known_maxims() {
        let logs: Vec<GameLog> = spam_logs("alice", 5).collect();
        assert_eq!(logs.len(), 5);
        for log in &logs {
            assert_eq!(log.username, "alice");
            assert!(WAR_QUOTES.contains(&log.message.as_str()));
        }
    }

    #[test]
    fn zero_count_is_empty() {
        assert_eq!(spam_logs("alice", 0).count(), 0);
    }

    #[test]
    fn huge_count_is_built_lazily() {
        let mut logs = spam_logs("alice", usize::MAX);
        assert_eq!(logs.size_hint(), (usize::MAX, Some(usize::MAX)));
        assert_eq!(logs.by_ref().take(3).count(), 3);
        assert!(logs.next().is_some());
    }
}
