//! Parsing of the interactive client's command lines.

use peril_types::enums::UnknownName;
use peril_types::{Location, UnitId, UnitRank};

use crate::error::ValidationError;

/// Usage line for `spawn`.
pub const SPAWN_USAGE: &str = "spawn <location> <rank>";
/// Usage line for `move`.
pub const MOVE_USAGE: &str = "move <location> <unit id> [unit id ...]";
/// Usage line for `spam`.
pub const SPAM_USAGE: &str = "spam <count>";

/// Largest count `spam` accepts.
pub const MAX_SPAM_COUNT: usize = 100_000;

/// Help text listing every client command.
pub const HELP: &str = "\
Possible commands:
* spawn <location> <rank>
    example: spawn europe infantry
* move <location> <unit id> [unit id ...]
    example: move asia 1 2
* status
* spam <count>
* help
* quit";

/// One parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a unit.
    Spawn {
        /// Where the unit appears.
        location: Location,
        /// Its rank.
        rank: UnitRank,
    },
    /// Move units that share an origin.
    Move {
        /// Destination.
        to_location: Location,
        /// Units to move.
        units: Vec<UnitId>,
    },
    /// Show the local replica.
    Status,
    /// Publish `count` junk game logs.
    Spam {
        /// Number of logs to publish.
        count: usize,
    },
    /// Print [`HELP`].
    Help,
    /// Leave the game.
    Quit,
}

impl Command {
    /// Parse a command line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ValidationError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Ok(None);
        };
        let command = match verb.to_lowercase().as_str() {
            "spawn" => parse_spawn(args)?,
            "move" => parse_move(args)?,
            "status" => Self::Status,
            "spam" => parse_spam(args)?,
            "help" => Self::Help,
            "quit" => Self::Quit,
            _ => return Err(ValidationError::UnknownCommand(verb.to_owned())),
        };
        Ok(Some(command))
    }
}

/// Validate a username typed at the welcome prompt.
///
/// The name becomes a routing-key segment, so it must be one non-empty
/// word without `.`, `*` or `#`.
pub fn parse_username(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '.' | '*' | '#'));
    if valid {
        Ok(name.to_owned())
    } else {
        Err(ValidationError::InvalidUsername(name.to_owned()))
    }
}

fn parse_location(word: &str) -> Result<Location, ValidationError> {
    word.to_lowercase()
        .parse()
        .map_err(|e: UnknownName| ValidationError::UnknownLocation(e.value))
}

fn parse_spawn(args: &[&str]) -> Result<Command, ValidationError> {
    let [location, rank, ..] = args else {
        return Err(ValidationError::Usage { usage: SPAWN_USAGE });
    };
    let location = parse_location(location)?;
    let rank = rank
        .to_lowercase()
        .parse()
        .map_err(|e: UnknownName| ValidationError::UnknownRank(e.value))?;
    Ok(Command::Spawn { location, rank })
}

fn parse_move(args: &[&str]) -> Result<Command, ValidationError> {
    let [location, ids @ ..] = args else {
        return Err(ValidationError::Usage { usage: MOVE_USAGE });
    };
    if ids.is_empty() {
        return Err(ValidationError::Usage { usage: MOVE_USAGE });
    }
    let to_location = parse_location(location)?;
    let units = ids
        .iter()
        .map(|id| {
            id.parse()
                .ok()
                .map(UnitId)
                .ok_or_else(|| ValidationError::InvalidUnitId((*id).to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command::Move { to_location, units })
}

fn parse_spam(args: &[&str]) -> Result<Command, ValidationError> {
    let [count, ..] = args else {
        return Err(ValidationError::Usage { usage: SPAM_USAGE });
    };
    let count = count
        .parse::<usize>()
        .ok()
        .filter(|&n| n <= MAX_SPAM_COUNT)
        .ok_or_else(|| ValidationError::InvalidCount((*count).to_owned()))?;
    Ok(Command::Spam { count })
}
