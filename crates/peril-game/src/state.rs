//! The local replica of the game world.
//!
//! [`Replica`] holds the pure state transitions. [`GameState`] wraps it for
//! sharing between the command loop and the subscription workers, which
//! run concurrently and must not interleave mutations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use peril_types::{ArmyMove, Location, Player, RecognitionOfWar, Unit, UnitId, UnitRank};
use tokio::sync::Mutex;
use tracing::debug;

use crate::combat::{self, BattleResult};
use crate::commands::MOVE_USAGE;
use crate::error::ValidationError;
use crate::outcome::{Battle, MoveOutcome, WarOutcome, WarResolution};

/// One player's knowledge of the world.
#[derive(Debug, Clone)]
pub struct Replica {
    player: Player,
    next_unit_id: u32,
    opponents: BTreeMap<String, Player>,
}

impl Replica {
    /// A replica for `username` with no units and no known opponents.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            player: Player::new(username),
            next_unit_id: 1,
            opponents: BTreeMap::new(),
        }
    }

    /// The local player.
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Last known snapshot of every opponent seen so far.
    pub const fn opponents(&self) -> &BTreeMap<String, Player> {
        &self.opponents
    }

    /// Create a unit at `location`.
    pub fn spawn(&mut self, location: Location, rank: UnitRank) -> Result<Unit, ValidationError> {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id = self
            .next_unit_id
            .checked_add(1)
            .ok_or(ValidationError::UnitIdsExhausted)?;
        let unit = Unit { id, location, rank };
        self.player.units.insert(id, unit);
        Ok(unit)
    }

    /// Build the move of `ids` to `to_location` without changing anything.
    ///
    /// All units must exist, be listed once, and share one origin.
    pub fn plan_move(
        &self,
        to_location: Location,
        ids: &[UnitId],
    ) -> Result<ArmyMove, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::Usage { usage: MOVE_USAGE });
        }

        let mut moved: Vec<Unit> = Vec::with_capacity(ids.len());
        let mut origin = None;
        for &id in ids {
            let unit = self
                .player
                .units
                .get(&id)
                .copied()
                .ok_or(ValidationError::UnitNotFound(id))?;
            if moved.iter().any(|m| m.id == id) {
                return Err(ValidationError::DuplicateUnit(id));
            }
            match origin {
                None => origin = Some(unit.location),
                Some(expected) if expected != unit.location => {
                    return Err(ValidationError::MixedOrigins {
                        unit: id,
                        expected,
                        found: unit.location,
                    });
                }
                Some(_) => {}
            }
            moved.push(Unit {
                location: to_location,
                ..unit
            });
        }

        let mut player = self.player.clone();
        for unit in &moved {
            player.units.insert(unit.id, *unit);
        }
        Ok(ArmyMove {
            player,
            units: moved,
            to_location,
        })
    }

    /// Apply a planned move to the local player once it has been published.
    pub fn commit_move(&mut self, army_move: &ArmyMove) {
        if army_move.player.username != self.player.username {
            return;
        }
        for unit in &army_move.units {
            if let Some(local) = self.player.units.get_mut(&unit.id) {
                local.location = army_move.to_location;
            }
        }
    }

    /// Merge an incoming move and classify it.
    ///
    /// Reapplying the same move leaves the replica unchanged.
    pub fn apply_move(&mut self, army_move: &ArmyMove) -> MoveOutcome {
        if army_move.player.username == self.player.username {
            return MoveOutcome::SamePlayer;
        }

        self.opponents
            .insert(army_move.player.username.clone(), army_move.player.clone());

        let to = army_move.to_location;
        let mover_present = !army_move.units.is_empty() || army_move.player.has_units_at(to);
        if mover_present && self.player.has_units_at(to) {
            MoveOutcome::MakeWar
        } else {
            MoveOutcome::Safe
        }
    }

    /// Resolve a war and apply its local side effects.
    ///
    /// Combat only reads the snapshots in `war`. The battle is fought at
    /// [`combat::contested_location`]: the first territory in
    /// [`Location::ALL`] order where both snapshots hold units, which need
    /// not be the destination of the move that started the war.
    ///
    /// Afterwards, a losing or drawing replica removes its own units at the
    /// contested location, so resolving the same war twice destroys nothing
    /// more.
    pub fn resolve_war(&mut self, war: &RecognitionOfWar) -> WarResolution {
        let attacking = if war.attacker.username == self.player.username {
            true
        } else if war.defender.username == self.player.username {
            false
        } else {
            return WarResolution::NotInvolved;
        };

        let Some(location) = combat::contested_location(&war.attacker, &war.defender) else {
            return WarResolution::NoUnits;
        };
        let theirs = if attacking {
            &war.defender
        } else {
            &war.attacker
        };

        let result = combat::fight(war, location);
        let outcome = match (result, attacking) {
            (BattleResult::Draw, _) => WarOutcome::Draw,
            (BattleResult::AttackerWon, true) | (BattleResult::DefenderWon, false) => {
                WarOutcome::YouWon
            }
            _ => WarOutcome::OpponentWon,
        };
        let (winner, loser) = match result {
            BattleResult::AttackerWon | BattleResult::Draw => (&war.attacker, &war.defender),
            BattleResult::DefenderWon => (&war.defender, &war.attacker),
        };

        let mut opponent = theirs.clone();
        if outcome != WarOutcome::OpponentWon {
            remove_units_at(&mut opponent, location);
        }
        let units_lost = if outcome == WarOutcome::YouWon {
            0
        } else {
            remove_units_at(&mut self.player, location)
        };
        let battle = Battle {
            location,
            outcome,
            winner: winner.username.clone(),
            loser: loser.username.clone(),
            units_lost,
        };
        self.opponents.insert(opponent.username.clone(), opponent);

        debug!(
            location = %location,
            outcome = %outcome,
            units_lost,
            "war resolved"
        );
        WarResolution::Fought(battle)
    }
}

fn remove_units_at(player: &mut Player, location: Location) -> usize {
    let before = player.units.len();
    player.units.retain(|_, unit| unit.location != location);
    before.saturating_sub(player.units.len())
}

/// Point-in-time view for the `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Whether the game is paused.
    pub paused: bool,
    /// The local player.
    pub player: Player,
    /// Known opponents, by username.
    pub opponents: Vec<Player>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.paused {
            writeln!(f, "The game is paused.")?;
        }
        writeln!(
            f,
            "Player {} has {} units:",
            self.player.username,
            self.player.units.len()
        )?;
        for unit in self.player.units.values() {
            writeln!(f, "  * {}: {}, {}", unit.id, unit.location, unit.rank)?;
        }
        for opponent in &self.opponents {
            writeln!(
                f,
                "Opponent {} was last seen with {} units",
                opponent.username,
                opponent.units.len()
            )?;
        }
        Ok(())
    }
}

/// Shared, synchronized game state for one client process.
#[derive(Debug)]
pub struct GameState {
    username: String,
    paused: AtomicBool,
    replica: Mutex<Replica>,
}

impl GameState {
    /// Fresh, unpaused state for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            replica: Mutex::new(Replica::new(username.clone())),
            username,
            paused: AtomicBool::new(false),
        }
    }

    /// The local player's username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether spawning and moving are currently refused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Set the pause flag, returning its previous value.
    pub fn set_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::AcqRel)
    }

    /// Spawn a unit, unless paused.
    pub async fn spawn(&self, location: Location, rank: UnitRank) -> Result<Unit, ValidationError> {
        self.ensure_running()?;
        self.replica.lock().await.spawn(location, rank)
    }

    /// Plan a move, unless paused. Nothing changes until
    /// [`commit_move`](Self::commit_move).
    pub async fn plan_move(
        &self,
        to_location: Location,
        ids: &[UnitId],
    ) -> Result<ArmyMove, ValidationError> {
        self.ensure_running()?;
        self.replica.lock().await.plan_move(to_location, ids)
    }

    /// See [`Replica::commit_move`].
    pub async fn commit_move(&self, army_move: &ArmyMove) {
        self.replica.lock().await.commit_move(army_move);
    }

    /// See [`Replica::apply_move`]. Also returns the local snapshot taken
    /// under the same lock, for the war recognition.
    pub async fn apply_move(&self, army_move: &ArmyMove) -> (MoveOutcome, Player) {
        let mut replica = self.replica.lock().await;
        let outcome = replica.apply_move(army_move);
        (outcome, replica.player.clone())
    }

    /// See [`Replica::resolve_war`].
    pub async fn resolve_war(&self, war: &RecognitionOfWar) -> WarResolution {
        self.replica.lock().await.resolve_war(war)
    }

    /// A copy of the local player.
    pub async fn snapshot(&self) -> Player {
        self.replica.lock().await.player.clone()
    }

    /// Everything the `status` command shows.
    pub async fn status(&self) -> Status {
        let replica = self.replica.lock().await;
        Status {
            paused: self.is_paused(),
            player: replica.player.clone(),
            opponents: replica.opponents.values().cloned().collect(),
        }
    }

    fn ensure_running(&self) -> Result<(), ValidationError> {
        if self.is_paused() {
            Err(ValidationError::Paused)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    fn replica_with(name: &str, units: &[(Location, UnitRank)]) -> Replica {
        let mut replica = Replica::new(name);
        for &(location, rank) in units {
            replica.spawn(location, rank).unwrap();
        }
        replica
    }

    #[test]
    fn spawn_allocates_increasing_ids() {
        let mut replica = Replica::new("alice");
        let first = replica.spawn(Location::Asia, UnitRank::Infantry).unwrap();
        let second = replica.spawn(Location::Europe, UnitRank::Cavalry).unwrap();
        assert_eq!(first.id, UnitId(1));
        assert_eq!(second.id, UnitId(2));
        assert_eq!(replica.player().units.len(), 2);
    }

    #[test]
    fn unit_ids_are_not_reused_after_losses() {
        let mut replica = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        remove_units_at(&mut replica.player, Location::Asia);
        let unit = replica.spawn(Location::Asia, UnitRank::Infantry).unwrap();
        assert_eq!(unit.id, UnitId(2));
    }

    #[test]
    fn plan_move_relocates_only_the_snapshot() {
        let replica = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        let planned = replica.plan_move(Location::Europe, &[UnitId(1)]).unwrap();
        assert_eq!(planned.to_location, Location::Europe);
        assert_eq!(planned.units[0].location, Location::Europe);
        assert!(planned.player.has_units_at(Location::Europe));
        assert!(replica.player().has_units_at(Location::Asia));
    }

    #[test]
    fn plan_move_rejects_bad_units() {
        let replica = replica_with(
            "alice",
            &[
                (Location::Asia, UnitRank::Infantry),
                (Location::Africa, UnitRank::Infantry),
            ],
        );
        assert_eq!(
            replica.plan_move(Location::Europe, &[UnitId(9)]),
            Err(ValidationError::UnitNotFound(UnitId(9)))
        );
        assert_eq!(
            replica.plan_move(Location::Europe, &[UnitId(1), UnitId(1)]),
            Err(ValidationError::DuplicateUnit(UnitId(1)))
        );
        assert_eq!(
            replica.plan_move(Location::Europe, &[UnitId(1), UnitId(2)]),
            Err(ValidationError::MixedOrigins {
                unit: UnitId(2),
                expected: Location::Asia,
                found: Location::Africa,
            })
        );
        assert!(matches!(
            replica.plan_move(Location::Europe, &[]),
            Err(ValidationError::Usage { .. })
        ));
    }

    #[test]
    fn commit_applies_the_planned_move() {
        let mut replica = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        let planned = replica.plan_move(Location::Europe, &[UnitId(1)]).unwrap();
        replica.commit_move(&planned);
        assert_eq!(replica.player(), &planned.player);
    }

    #[test]
    fn own_move_is_same_player_and_changes_nothing() {
        let mut replica = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        let planned = replica.plan_move(Location::Europe, &[UnitId(1)]).unwrap();
        assert_eq!(replica.apply_move(&planned), MoveOutcome::SamePlayer);
        assert!(replica.opponents().is_empty());
        assert!(replica.player().has_units_at(Location::Asia));
    }

    #[test]
    fn move_into_occupied_territory_makes_war() {
        let attacker = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        let mut defender = replica_with("bob", &[(Location::Europe, UnitRank::Cavalry)]);
        let planned = attacker.plan_move(Location::Europe, &[UnitId(1)]).unwrap();

        assert_eq!(defender.apply_move(&planned), MoveOutcome::MakeWar);
        let before = defender.clone();
        assert_eq!(defender.apply_move(&planned), MoveOutcome::MakeWar);
        assert_eq!(defender.opponents(), before.opponents());
        assert_eq!(defender.opponents()["alice"], planned.player);
    }

    #[test]
    fn move_into_empty_territory_is_safe() {
        let attacker = replica_with("alice", &[(Location::Asia, UnitRank::Infantry)]);
        let mut other = replica_with("bob", &[(Location::Africa, UnitRank::Cavalry)]);
        let planned = attacker.plan_move(Location::Europe, &[UnitId(1)]).unwrap();
        assert_eq!(other.apply_move(&planned), MoveOutcome::Safe);
        assert!(other.opponents().contains_key("alice"));
    }

    fn war(attacker: &Replica, defender: &Replica) -> RecognitionOfWar {
        RecognitionOfWar {
            attacker: attacker.player().clone(),
            defender: defender.player().clone(),
        }
    }

    #[test]
    fn loser_removes_its_units_once() {
        let attacker = replica_with("alice", &[(Location::Europe, UnitRank::Infantry)]);
        let mut defender = replica_with(
            "bob",
            &[
                (Location::Europe, UnitRank::Cavalry),
                (Location::Asia, UnitRank::Infantry),
            ],
        );
        let recognition = war(&attacker, &defender);
        let mut attacker = attacker;

        let WarResolution::Fought(lost) = attacker.resolve_war(&recognition) else {
            panic!("expected a battle");
        };
        assert_eq!(lost.outcome, WarOutcome::OpponentWon);
        assert_eq!(lost.units_lost, 1);
        assert_eq!(lost.log_message(), "bob won a war against alice");
        assert!(attacker.player().units.is_empty());

        let WarResolution::Fought(again) = attacker.resolve_war(&recognition) else {
            panic!("expected a battle");
        };
        assert_eq!(again.outcome, WarOutcome::OpponentWon);
        assert_eq!(again.units_lost, 0);

        let WarResolution::Fought(won) = defender.resolve_war(&recognition) else {
            panic!("expected a battle");
        };
        assert_eq!(won.outcome, WarOutcome::YouWon);
        assert_eq!(won.units_lost, 0);
        assert_eq!(defender.player().units.len(), 2);
        assert!(defender.opponents()["alice"].units.is_empty());
    }

    #[test]
    fn draw_costs_both_sides() {
        let mut attacker = replica_with("alice", &[(Location::Asia, UnitRank::Cavalry)]);
        let mut defender = replica_with("bob", &[(Location::Asia, UnitRank::Cavalry)]);
        let recognition = war(&attacker, &defender);

        for replica in [&mut attacker, &mut defender] {
            let WarResolution::Fought(battle) = replica.resolve_war(&recognition) else {
                panic!("expected a battle");
            };
            assert_eq!(battle.outcome, WarOutcome::Draw);
            assert_eq!(
                battle.log_message(),
                "A war between alice and bob resulted in a draw"
            );
            assert!(replica.player().units.is_empty());
        }
    }

    #[test]
    fn bystander_is_not_involved() {
        let attacker = replica_with("alice", &[(Location::Asia, UnitRank::Cavalry)]);
        let defender = replica_with("bob", &[(Location::Asia, UnitRank::Cavalry)]);
        let mut bystander = replica_with("carol", &[(Location::Asia, UnitRank::Artillery)]);
        let recognition = war(&attacker, &defender);
        assert_eq!(
            bystander.resolve_war(&recognition),
            WarResolution::NotInvolved
        );
        assert_eq!(bystander.player().units.len(), 1);
    }

    #[test]
    fn no_shared_territory_means_no_units() {
        let mut attacker = replica_with("alice", &[(Location::Asia, UnitRank::Cavalry)]);
        let defender = replica_with("bob", &[(Location::Africa, UnitRank::Cavalry)]);
        let recognition = war(&attacker, &defender);
        assert_eq!(attacker.resolve_war(&recognition), WarResolution::NoUnits);
    }

    #[test]
    fn war_is_fought_at_the_first_shared_territory() {
        let mut alice = replica_with(
            "alice",
            &[
                (Location::Americas, UnitRank::Artillery),
                (Location::Africa, UnitRank::Infantry),
            ],
        );
        let mut bob = replica_with(
            "bob",
            &[
                (Location::Americas, UnitRank::Infantry),
                (Location::Asia, UnitRank::Cavalry),
            ],
        );
        let planned = alice.plan_move(Location::Asia, &[UnitId(2)]).unwrap();
        alice.commit_move(&planned);
        assert_eq!(bob.apply_move(&planned), MoveOutcome::MakeWar);
        let recognition = RecognitionOfWar {
            attacker: planned.player,
            defender: bob.player().clone(),
        };

        let WarResolution::Fought(battle) = bob.resolve_war(&recognition) else {
            panic!("expected a battle");
        };
        assert_eq!(battle.location, Location::Americas);
        assert_eq!(battle.outcome, WarOutcome::OpponentWon);
        assert_eq!(battle.units_lost, 1);
        assert!(bob.player().has_units_at(Location::Asia));
        assert!(!bob.player().has_units_at(Location::Americas));

        let WarResolution::Fought(battle) = alice.resolve_war(&recognition) else {
            panic!("expected a battle");
        };
        assert_eq!(battle.location, Location::Americas);
        assert_eq!(battle.outcome, WarOutcome::YouWon);
        assert_eq!(alice.player().units.len(), 2);
    }

    #[tokio::test]
    async fn paused_state_refuses_commands() {
        let state = GameState::new("alice");
        let unit = state
            .spawn(Location::Asia, UnitRank::Infantry)
            .await
            .unwrap();
        assert!(!state.set_paused(true));
        assert_eq!(
            state.spawn(Location::Asia, UnitRank::Infantry).await,
            Err(ValidationError::Paused)
        );
        assert_eq!(
            state.plan_move(Location::Europe, &[unit.id]).await,
            Err(ValidationError::Paused)
        );
        assert!(state.set_paused(false));
        assert!(state.plan_move(Location::Europe, &[unit.id]).await.is_ok());
    }

    #[tokio::test]
    async fn status_lists_units_and_opponents() {
        let state = GameState::new("alice");
        state
            .spawn(Location::Asia, UnitRank::Artillery)
            .await
            .unwrap();
        let bob = replica_with("bob", &[(Location::Africa, UnitRank::Infantry)]);
        let planned = bob.plan_move(Location::Europe, &[UnitId(1)]).unwrap();
        let (outcome, _) = state.apply_move(&planned).await;
        assert_eq!(outcome, MoveOutcome::Safe);

        let status = state.status().await;
        assert_eq!(status.opponents.len(), 1);
        let text = status.to_string();
        assert!(text.contains("Player alice has 1 units"));
        assert!(text.contains("1: asia, artillery"));
        assert!(text.contains("Opponent bob"));
    }
}
