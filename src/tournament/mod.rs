//! Tournament bracket engine
//!
//! Single-elimination tournaments over the room lifecycle: participants
//! are shuffled uniformly at start, paired into a bracket with byes for
//! odd counts, and advanced round by round as match winners are
//! reported. Entry fees fund the prize pool; the platform fee is
//! withheld before distribution.
//!
//! Shuffling is deliberately random (fair seeding). Tests inject a
//! seeded generator and assert structural properties of the bracket
//! rather than exact pairings.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TournamentConfig;
use crate::error::{Error, Result};
use crate::room::{RoomEvent, RoomManager, RoomSettings};
use crate::storage::{Notifier, RemoteStore};
use crate::wallet::{BalanceOp, WalletLedger};

/// Tournament lifecycle; `Cancelled` is reachable from any state short
/// of `Completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    Open,
    Started,
    Completed,
    Cancelled,
}

/// Per-match status within the bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Pending,
    Ready,
    Playing,
    Completed,
}

/// One bracket slot. `player2 = None` on a populated match encodes a
/// bye: the winner is auto-assigned and the match completes immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketMatch {
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub winner: Option<String>,
    pub game_id: Option<String>,
    pub room_code: Option<String>,
    pub status: MatchStatus,
}

impl BracketMatch {
    fn empty() -> Self {
        Self {
            player1: None,
            player2: None,
            winner: None,
            game_id: None,
            room_code: None,
            status: MatchStatus::Pending,
        }
    }

    /// The defeated player, when the match had two real entrants
    pub fn loser(&self) -> Option<&String> {
        let winner = self.winner.as_ref()?;
        let p2 = self.player2.as_ref()?;
        if self.player1.as_ref() == Some(winner) {
            Some(p2)
        } else {
            self.player1.as_ref()
        }
    }
}

/// Tournament record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub entry_fee: u64,
    pub max_participants: usize,
    pub participants: Vec<String>,
    pub status: TournamentStatus,
    pub bracket: Vec<Vec<BracketMatch>>,
    pub current_round: usize,
    pub winner: Option<String>,
}

/// Settings supplied when creating a tournament
#[derive(Debug, Clone)]
pub struct TournamentSpec {
    pub entry_fee: u64,
    pub max_participants: usize,
}

/// Prize amounts computed for a completed tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeBreakdown {
    pub pool: u64,
    pub winner_amount: u64,
    pub second_amount: u64,
    pub third_amount: u64,
}

/// Compute the net pool and prize shares for a participant count.
/// Shares that don't apply at this size are zero; the sum of shares
/// never exceeds the pool.
pub fn prize_shares(entry_fee: u64, participants: usize, config: &TournamentConfig) -> PrizeBreakdown {
    let total_fees = entry_fee * participants as u64;
    let pool = total_fees * (100 - config.platform_fee_percent) / 100;
    let winner_amount = pool * config.winner_share_percent / 100;
    let second_amount = if participants >= config.second_place_min {
        pool * config.second_share_percent / 100
    } else {
        0
    };
    let third_amount = if participants >= config.third_place_min {
        pool * config.third_share_percent / 100
    } else {
        0
    };
    PrizeBreakdown {
        pool,
        winner_amount,
        second_amount,
        third_amount,
    }
}

/// Events broadcast after tournament state has been persisted
#[derive(Debug, Clone)]
pub enum TournamentEvent {
    Created { tournament_id: String },
    ParticipantJoined { tournament_id: String, user_id: String },
    Started { tournament_id: String, rounds: usize },
    MatchCompleted {
        tournament_id: String,
        round: usize,
        match_index: usize,
        winner: String,
    },
    RoundAdvanced { tournament_id: String, round: usize },
    Completed { tournament_id: String, winner: String },
    Cancelled { tournament_id: String, reason: String },
}

/// Tournament bracket engine
pub struct TournamentManager {
    tournaments: RwLock<HashMap<String, Tournament>>,
    rooms: Arc<RoomManager>,
    wallet: Arc<WalletLedger>,
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    event_tx: broadcast::Sender<TournamentEvent>,
    config: TournamentConfig,
}

impl TournamentManager {
    pub fn new(
        rooms: Arc<RoomManager>,
        wallet: Arc<WalletLedger>,
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notifier>,
        config: TournamentConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            tournaments: RwLock::new(HashMap::new()),
            rooms,
            wallet,
            store,
            notifier,
            event_tx,
            config,
        }
    }

    /// Subscribe to tournament events
    pub fn subscribe(&self) -> broadcast::Receiver<TournamentEvent> {
        self.event_tx.subscribe()
    }

    /// Spawn the task that routes finished games from the room event
    /// stream into bracket settlement. The subscription is taken before
    /// the task starts, so no game-end event can slip past it. The task
    /// holds only a weak reference; dropping the manager ends it.
    pub fn spawn_settlement_listener(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut events = self.rooms.subscribe();
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "settlement listener lagged behind room events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let RoomEvent::GameEnded { game_id, winner, .. } = event else {
                    continue;
                };
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if let Err(err) = manager.settle_game(&game_id, &winner).await {
                    warn!(%game_id, %err, "tournament settlement failed");
                }
            }
        })
    }

    /// Record the winner of a finished game in its bracket slot. Games
    /// not hosted by a running tournament are casual matches and are
    /// ignored.
    pub async fn settle_game(&self, game_id: &str, winner_id: &str) -> Result<()> {
        let slot = {
            let tournaments = self.tournaments.read().await;
            tournaments.iter().find_map(|(id, t)| {
                if t.status != TournamentStatus::Started {
                    return None;
                }
                t.bracket.iter().enumerate().find_map(|(round, matches)| {
                    matches
                        .iter()
                        .position(|m| m.game_id.as_deref() == Some(game_id))
                        .map(|i| (id.clone(), round, i))
                })
            })
        };
        let Some((tournament_id, round, match_index)) = slot else {
            return Ok(());
        };
        self.handle_match_completion(&tournament_id, round, match_index, winner_id)
            .await
    }

    /// Create a tournament open for registration
    pub async fn create_tournament(&self, spec: TournamentSpec, creator_id: &str) -> Result<String> {
        if spec.max_participants < self.config.min_participants {
            return Err(Error::Validation(format!(
                "max_participants must be at least {}",
                self.config.min_participants
            )));
        }

        let tournament = Tournament {
            id: Uuid::new_v4().to_string(),
            entry_fee: spec.entry_fee,
            max_participants: spec.max_participants,
            participants: Vec::new(),
            status: TournamentStatus::Open,
            bracket: Vec::new(),
            current_round: 0,
            winner: None,
        };
        let id = tournament.id.clone();

        self.persist(&tournament).await?;
        self.tournaments.write().await.insert(id.clone(), tournament);

        info!(tournament_id = %id, creator_id, "tournament created");
        self.broadcast(TournamentEvent::Created {
            tournament_id: id.clone(),
        });
        Ok(id)
    }

    /// Register a participant, atomically debiting the entry fee. The
    /// debit and the participant append happen under the write lock so
    /// concurrent joins serialize.
    pub async fn join_tournament(&self, tournament_id: &str, user_id: &str) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status != TournamentStatus::Open {
            return Err(Error::TournamentNotOpen);
        }
        if tournament.participants.iter().any(|p| p == user_id) {
            return Err(Error::AlreadyRegistered);
        }
        if tournament.participants.len() >= tournament.max_participants {
            return Err(Error::TournamentFull);
        }

        // Debit before appending; an insufficient balance leaves the
        // participant list untouched
        self.wallet
            .update_balance(
                user_id,
                tournament.entry_fee,
                BalanceOp::Subtract,
                format!("entry fee for tournament {}", tournament_id),
            )
            .await?;

        tournament.participants.push(user_id.to_string());
        let snapshot = tournament.clone();
        self.persist(&snapshot).await?;
        drop(tournaments);

        info!(tournament_id, user_id, "participant joined tournament");
        self.broadcast(TournamentEvent::ParticipantJoined {
            tournament_id: tournament_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    /// Start the tournament with entropy-seeded shuffling
    pub async fn start_tournament(&self, tournament_id: &str) -> Result<()> {
        let mut rng = StdRng::from_entropy();
        self.start_with_rng(tournament_id, &mut rng).await
    }

    /// Start with a caller-seeded generator; tests use this to pin the
    /// shuffle while asserting bracket structure
    pub async fn start_tournament_seeded(&self, tournament_id: &str, seed: u64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.start_with_rng(tournament_id, &mut rng).await
    }

    async fn start_with_rng<R: Rng>(&self, tournament_id: &str, rng: &mut R) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status != TournamentStatus::Open {
            return Err(Error::TournamentNotOpen);
        }
        if tournament.participants.len() < self.config.min_participants {
            return Err(Error::NotEnoughPlayers(self.config.min_participants));
        }

        let mut seeding = tournament.participants.clone();
        seeding.shuffle(rng);
        tournament.bracket = build_bracket(&seeding);
        tournament.status = TournamentStatus::Started;
        tournament.current_round = 0;

        // First-round byes advance immediately; chains of byes collapse
        let first_round_len = tournament.bracket[0].len();
        for match_index in 0..first_round_len {
            if tournament.bracket[0][match_index].status == MatchStatus::Completed {
                self.propagate_winner(tournament, 0, match_index).await?;
            }
        }

        // Spawn rooms for first-round matches with two real players
        for match_index in 0..first_round_len {
            self.spawn_room_if_ready(tournament, 0, match_index).await?;
        }

        let snapshot = tournament.clone();
        let rounds = snapshot.bracket.len();
        self.persist(&snapshot).await?;
        drop(tournaments);

        info!(tournament_id, rounds, "tournament started");
        self.broadcast(TournamentEvent::Started {
            tournament_id: tournament_id.to_string(),
            rounds,
        });
        Ok(())
    }

    /// Record a match winner. When the round is fully completed the
    /// bracket advances: winners fill the next round's slots, rooms
    /// spawn as pairs fill, and the final match completes the
    /// tournament.
    pub async fn handle_match_completion(
        &self,
        tournament_id: &str,
        round: usize,
        match_index: usize,
        winner_id: &str,
    ) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status != TournamentStatus::Started {
            return Err(Error::InvalidState("tournament not in progress".to_string()));
        }
        let m = tournament
            .bracket
            .get_mut(round)
            .and_then(|r| r.get_mut(match_index))
            .ok_or_else(|| Error::InvalidInput("no such bracket match".to_string()))?;

        if m.status == MatchStatus::Completed {
            return Err(Error::InvalidState("match already completed".to_string()));
        }
        let is_entrant = m.player1.as_deref() == Some(winner_id)
            || m.player2.as_deref() == Some(winner_id);
        if !is_entrant {
            return Err(Error::InvalidInput(format!(
                "{} is not an entrant of this match",
                winner_id
            )));
        }

        m.winner = Some(winner_id.to_string());
        m.status = MatchStatus::Completed;
        debug!(tournament_id, round, match_index, winner_id, "match completed");

        let round_done = tournament.bracket[round]
            .iter()
            .all(|m| m.status == MatchStatus::Completed);

        if round_done {
            if round + 1 < tournament.bracket.len() {
                for i in 0..tournament.bracket[round].len() {
                    self.propagate_winner(tournament, round, i).await?;
                }
                for i in 0..tournament.bracket[round + 1].len() {
                    self.spawn_room_if_ready(tournament, round + 1, i).await?;
                }
                tournament.current_round = round + 1;
                let snapshot = tournament.clone();
                self.persist(&snapshot).await?;
                drop(tournaments);

                self.broadcast(TournamentEvent::MatchCompleted {
                    tournament_id: tournament_id.to_string(),
                    round,
                    match_index,
                    winner: winner_id.to_string(),
                });
                self.broadcast(TournamentEvent::RoundAdvanced {
                    tournament_id: tournament_id.to_string(),
                    round: round + 1,
                });
                return Ok(());
            }

            // Final round finished
            let snapshot = tournament.clone();
            self.persist(&snapshot).await?;
            drop(tournaments);
            self.broadcast(TournamentEvent::MatchCompleted {
                tournament_id: tournament_id.to_string(),
                round,
                match_index,
                winner: winner_id.to_string(),
            });
            return self.complete_tournament(tournament_id, winner_id).await;
        }

        let snapshot = tournament.clone();
        self.persist(&snapshot).await?;
        drop(tournaments);

        self.broadcast(TournamentEvent::MatchCompleted {
            tournament_id: tournament_id.to_string(),
            round,
            match_index,
            winner: winner_id.to_string(),
        });
        Ok(())
    }

    /// Distribute prizes and close the tournament. The winner takes the
    /// configured share of the net pool; second and third places apply
    /// only at the configured participant counts. Settlement requires a
    /// tournament still in progress: a cancelled tournament has already
    /// refunded its fees and must never pay prizes on top.
    pub async fn complete_tournament(&self, tournament_id: &str, winner_id: &str) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))?;

        match tournament.status {
            TournamentStatus::Started => {}
            TournamentStatus::Completed => return Err(Error::TournamentCompleted),
            _ => return Err(Error::InvalidState("tournament not in progress".to_string())),
        }
        if !tournament.participants.iter().any(|p| p == winner_id) {
            return Err(Error::InvalidInput(format!(
                "{} is not a tournament participant",
                winner_id
            )));
        }

        let n = tournament.participants.len();
        let shares = prize_shares(tournament.entry_fee, n, &self.config);

        let final_round = tournament.bracket.last();
        let second = final_round
            .and_then(|r| r.first())
            .and_then(|m| m.loser())
            .cloned();
        // Third place: the first semifinal loser, when the bracket is
        // deep enough to have semifinals
        let third = if tournament.bracket.len() >= 2 {
            tournament.bracket[tournament.bracket.len() - 2]
                .iter()
                .find_map(|m| m.loser())
                .filter(|loser| Some(loser.as_str()) != second.as_deref())
                .cloned()
        } else {
            None
        };

        self.wallet
            .update_balance(
                winner_id,
                shares.winner_amount,
                BalanceOp::Add,
                format!("tournament {} first prize", tournament_id),
            )
            .await?;
        if shares.second_amount > 0 {
            if let Some(second) = &second {
                self.wallet
                    .update_balance(
                        second,
                        shares.second_amount,
                        BalanceOp::Add,
                        format!("tournament {} second prize", tournament_id),
                    )
                    .await?;
            }
        }
        if shares.third_amount > 0 {
            if let Some(third) = &third {
                self.wallet
                    .update_balance(
                        third,
                        shares.third_amount,
                        BalanceOp::Add,
                        format!("tournament {} third prize", tournament_id),
                    )
                    .await?;
            }
        }

        tournament.status = TournamentStatus::Completed;
        tournament.winner = Some(winner_id.to_string());
        let snapshot = tournament.clone();
        self.persist(&snapshot).await?;

        let participants = snapshot.participants.clone();
        drop(tournaments);

        info!(tournament_id, winner_id, pool = shares.pool, "tournament completed");
        for participant in &participants {
            if participant == winner_id {
                self.notifier
                    .send_local(
                        "Tournament won!",
                        &format!("You won {} from the prize pool", shares.winner_amount),
                    )
                    .await;
            } else {
                self.notifier
                    .send_local("Tournament over", &format!("{} won the tournament", winner_id))
                    .await;
            }
        }
        self.broadcast(TournamentEvent::Completed {
            tournament_id: tournament_id.to_string(),
            winner: winner_id.to_string(),
        });
        Ok(())
    }

    /// Cancel and refund every participant's entry fee in full
    pub async fn cancel_tournament(&self, tournament_id: &str, reason: &str) -> Result<()> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status == TournamentStatus::Completed {
            return Err(Error::TournamentCompleted);
        }

        for participant in tournament.participants.clone() {
            self.wallet
                .update_balance(
                    &participant,
                    tournament.entry_fee,
                    BalanceOp::Add,
                    format!("refund: tournament {} cancelled", tournament_id),
                )
                .await?;
        }

        tournament.status = TournamentStatus::Cancelled;
        let snapshot = tournament.clone();
        self.persist(&snapshot).await?;
        let participants = snapshot.participants.clone();
        drop(tournaments);

        warn!(tournament_id, reason, "tournament cancelled, fees refunded");
        for _ in &participants {
            self.notifier
                .send_local("Tournament cancelled", reason)
                .await;
        }
        self.broadcast(TournamentEvent::Cancelled {
            tournament_id: tournament_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// A snapshot of a tournament
    pub async fn tournament(&self, tournament_id: &str) -> Result<Tournament> {
        self.tournaments
            .read()
            .await
            .get(tournament_id)
            .cloned()
            .ok_or_else(|| Error::TournamentNotFound(tournament_id.to_string()))
    }

    /// Feed a completed match's winner into the next round. Idempotent:
    /// an already-filled slot is left alone. A slot with no possible
    /// second feeder becomes a bye and collapses recursively.
    async fn propagate_winner(
        &self,
        tournament: &mut Tournament,
        round: usize,
        match_index: usize,
    ) -> Result<()> {
        let Some(winner) = tournament.bracket[round][match_index].winner.clone() else {
            return Ok(());
        };
        if round + 1 >= tournament.bracket.len() {
            return Ok(());
        }

        let feeder_count = tournament.bracket[round].len();
        let next_index = match_index / 2;
        let into_player1 = match_index % 2 == 0;
        let next = &mut tournament.bracket[round + 1][next_index];

        if into_player1 {
            if next.player1.is_none() {
                next.player1 = Some(winner);
            }
        } else if next.player2.is_none() {
            next.player2 = Some(winner);
        }

        // No feeder exists for the second slot: this match is a bye
        let second_feeder_missing = 2 * next_index + 1 >= feeder_count;
        if second_feeder_missing && next.player1.is_some() && next.status == MatchStatus::Pending {
            next.winner = next.player1.clone();
            next.status = MatchStatus::Completed;
            debug!(round = round + 1, match_index = next_index, "bye advanced");
            return Box::pin(self.propagate_winner(tournament, round + 1, next_index)).await;
        }
        Ok(())
    }

    /// Create and auto-join a room once both slots of a match are real
    async fn spawn_room_if_ready(
        &self,
        tournament: &mut Tournament,
        round: usize,
        match_index: usize,
    ) -> Result<()> {
        let m = &tournament.bracket[round][match_index];
        if m.status != MatchStatus::Pending || m.room_code.is_some() {
            return Ok(());
        }
        let (Some(p1), Some(p2)) = (m.player1.clone(), m.player2.clone()) else {
            return Ok(());
        };

        let (room_code, game_id) = self
            .rooms
            .create_room(RoomSettings { max_players: 2 }, &p1)
            .await?;
        self.rooms.join_room(&room_code, &p2).await?;

        let m = &mut tournament.bracket[round][match_index];
        m.room_code = Some(room_code);
        m.game_id = Some(game_id);
        m.status = MatchStatus::Ready;
        Ok(())
    }

    async fn persist(&self, tournament: &Tournament) -> Result<()> {
        let value = serde_json::to_value(tournament)?;
        self.store
            .write(&format!("tournaments/{}", tournament.id), value)
            .await
    }

    fn broadcast(&self, event: TournamentEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Build the full bracket skeleton for a seeded participant list:
/// adjacent pairs in round zero, empty matches in later rounds, byes
/// completed on the spot.
fn build_bracket(seeding: &[String]) -> Vec<Vec<BracketMatch>> {

    let mut rounds: Vec<Vec<BracketMatch>> = Vec::new();
    let mut first = Vec::new();
    for chunk in seeding.chunks(2) {
        let mut m = BracketMatch::empty();
        m.player1 = Some(chunk[0].clone());
        if let Some(p2) = chunk.get(1) {
            m.player2 = Some(p2.clone());
        } else {
            // Odd one out: immediate bye win
            m.winner = m.player1.clone();
            m.status = MatchStatus::Completed;
        }
        first.push(m);
    }
    let mut size = first.len();
    rounds.push(first);

    while size > 1 {
        size = size.div_ceil(2);
        rounds.push((0..size).map(|_| BracketMatch::empty()).collect());
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[test]
    fn test_first_round_match_count() {
        for n in 2..=16 {
            let seeding = names(n);
            let bracket = build_bracket(&seeding);
            assert_eq!(bracket[0].len(), n.div_ceil(2), "n = {}", n);
        }
    }

    #[test]
    fn test_round_count_is_log2_ceil() {
        let cases = [(2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4)];
        for (n, rounds) in cases {
            let bracket = build_bracket(&names(n));
            assert_eq!(bracket.len(), rounds, "n = {}", n);
        }
    }

    #[test]
    fn test_odd_count_gets_one_bye() {
        let bracket = build_bracket(&names(5));
        let byes: Vec<_> = bracket[0]
            .iter()
            .filter(|m| m.player2.is_none())
            .collect();
        assert_eq!(byes.len(), 1);
        assert_eq!(byes[0].status, MatchStatus::Completed);
        assert_eq!(byes[0].winner, byes[0].player1);
    }

    #[test]
    fn test_prize_shares_small_pool() {
        let config = TournamentConfig::default();
        // 3 entrants at 100: pool = 270, only the winner share applies
        let shares = prize_shares(100, 3, &config);
        assert_eq!(shares.pool, 270);
        assert_eq!(shares.winner_amount, 189);
        assert_eq!(shares.second_amount, 0);
        assert_eq!(shares.third_amount, 0);
    }

    #[test]
    fn test_prize_shares_never_exceed_pool() {
        let config = TournamentConfig::default();
        for n in 2..=32 {
            for fee in [1u64, 7, 100, 999] {
                let shares = prize_shares(fee, n, &config);
                assert!(
                    shares.winner_amount + shares.second_amount + shares.third_amount
                        <= shares.pool,
                    "n = {}, fee = {}",
                    n,
                    fee
                );
                assert_eq!(shares.pool, fee * n as u64 * 90 / 100);
            }
        }
    }

    #[test]
    fn test_match_loser() {
        let mut m = BracketMatch::empty();
        m.player1 = Some("a".to_string());
        m.player2 = Some("b".to_string());
        m.winner = Some("b".to_string());
        assert_eq!(m.loser(), Some(&"a".to_string()));

        // A bye has no loser
        let mut bye = BracketMatch::empty();
        bye.player1 = Some("c".to_string());
        bye.winner = Some("c".to_string());
        assert_eq!(bye.loser(), None);
    }
}
