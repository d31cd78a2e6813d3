//! Room and match lifecycle management
//!
//! Rooms move through `Waiting -> Playing -> Finished`. The manager owns
//! the registries of rooms and live games, validates every operation
//! against the caller, and applies the mandatory ordering: mutate state,
//! persist to the remote store, then broadcast. A persistence failure
//! aborts before any subscriber hears about the change.
//!
//! Move and dice application are serialized per game through the game's
//! own mutex, so concurrent calls against the same game cannot race the
//! turn-ownership check.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RoomConfig;
use crate::error::{Error, Result};
use crate::game::{
    apply_move, apply_roll, GameState, GameStatus, MoveOutcome, Player, PlayerColor, RollOutcome,
    ENTRY_ROLL,
};
use crate::storage::{Notifier, RemoteStore};

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Room lifecycle status; terminal at `Finished`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A joinable room hosting one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_code: String,
    pub game_id: String,
    pub host: String,
    pub players: Vec<String>,
    pub status: RoomStatus,
    pub max_players: usize,
}

impl Room {
    pub fn current_players(&self) -> usize {
        self.players.len()
    }
}

/// Settings supplied when creating a room
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub max_players: usize,
}

/// Events broadcast to room and game subscribers, always after the
/// corresponding state has been persisted
#[derive(Debug, Clone)]
pub enum RoomEvent {
    RoomCreated {
        room_code: String,
        host: String,
    },
    PlayerJoined {
        room_code: String,
        user_id: String,
    },
    PlayerLeft {
        room_code: String,
        user_id: String,
        new_host: Option<String>,
    },
    RoomDeleted {
        room_code: String,
    },
    GameStarted {
        room_code: String,
        game_id: String,
    },
    DiceRolled {
        game_id: String,
        user_id: String,
        value: u8,
        passed: bool,
    },
    MoveApplied {
        game_id: String,
        user_id: String,
        piece_id: u8,
    },
    GameEnded {
        room_code: String,
        game_id: String,
        winner: String,
    },
}

/// Handle to one live game: state plus its serialization lock
struct GameHandle {
    room_code: String,
    state: Mutex<GameState>,
}

/// Room and match lifecycle manager
pub struct RoomManager {
    rooms: RwLock<HashMap<String, Room>>,
    games: RwLock<HashMap<String, Arc<GameHandle>>>,
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    event_tx: broadcast::Sender<RoomEvent>,
    config: RoomConfig,
}

impl RoomManager {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notifier>,
        config: RoomConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            rooms: RwLock::new(HashMap::new()),
            games: RwLock::new(HashMap::new()),
            store,
            notifier,
            event_tx,
            config,
        }
    }

    /// Subscribe to room and game events
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.event_tx.subscribe()
    }

    /// Create a room with a fresh code and game id
    pub async fn create_room(
        &self,
        settings: RoomSettings,
        host_id: &str,
    ) -> Result<(String, String)> {
        if settings.max_players < 2 || settings.max_players > PlayerColor::ALL.len() {
            return Err(Error::Validation(format!(
                "max_players must be between 2 and {}",
                PlayerColor::ALL.len()
            )));
        }

        let mut rooms = self.rooms.write().await;
        let room_code = loop {
            let candidate = generate_room_code(self.config.room_code_len);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let game_id = Uuid::new_v4().to_string();

        let room = Room {
            room_code: room_code.clone(),
            game_id: game_id.clone(),
            host: host_id.to_string(),
            players: vec![host_id.to_string()],
            status: RoomStatus::Waiting,
            max_players: settings.max_players,
        };

        self.persist_room(&room).await?;
        rooms.insert(room_code.clone(), room);
        drop(rooms);

        info!(room_code = %room_code, host = host_id, "room created");
        self.broadcast(RoomEvent::RoomCreated {
            room_code: room_code.clone(),
            host: host_id.to_string(),
        });
        Ok((room_code, game_id))
    }

    /// Join an existing room. Capacity is re-checked under the write
    /// lock so concurrent joins cannot both pass.
    pub async fn join_room(&self, room_code: &str, player_id: &str) -> Result<()> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(room_code)
            .ok_or_else(|| Error::RoomNotFound(room_code.to_string()))?;

        if room.status != RoomStatus::Waiting {
            return Err(Error::GameAlreadyStarted);
        }
        if room.players.len() >= room.max_players {
            return Err(Error::RoomFull);
        }
        if room.players.iter().any(|p| p == player_id) {
            return Err(Error::AlreadyInRoom);
        }

        room.players.push(player_id.to_string());
        let snapshot = room.clone();
        self.persist_room(&snapshot).await?;
        drop(rooms);

        info!(room_code, player_id, "player joined room");
        self.notifier
            .send_local("Player joined", &format!("{} joined the room", player_id))
            .await;
        self.broadcast(RoomEvent::PlayerJoined {
            room_code: room_code.to_string(),
            user_id: player_id.to_string(),
        });
        Ok(())
    }

    /// Leave a room: delete it when empty, transfer host when needed
    pub async fn leave_room(&self, room_code: &str, player_id: &str) -> Result<()> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(room_code)
            .ok_or_else(|| Error::RoomNotFound(room_code.to_string()))?;

        let before = room.players.len();
        room.players.retain(|p| p != player_id);
        if room.players.len() == before {
            return Err(Error::InvalidInput(format!(
                "player {} not in room",
                player_id
            )));
        }

        if room.players.is_empty() {
            rooms.remove(room_code);
            self.store.delete(&room_key(room_code)).await?;
            drop(rooms);
            info!(room_code, "room emptied and deleted");
            self.broadcast(RoomEvent::RoomDeleted {
                room_code: room_code.to_string(),
            });
            return Ok(());
        }

        // Host role transfers to the first remaining player
        let mut new_host = None;
        if room.host == player_id {
            room.host = room.players[0].clone();
            new_host = Some(room.host.clone());
        }
        let snapshot = room.clone();
        self.persist_room(&snapshot).await?;
        drop(rooms);

        info!(room_code, player_id, ?new_host, "player left room");
        self.broadcast(RoomEvent::PlayerLeft {
            room_code: room_code.to_string(),
            user_id: player_id.to_string(),
            new_host,
        });
        Ok(())
    }

    /// Start the match: colors assigned in join order, initial game
    /// state persisted under the game id, room flipped to `Playing`.
    pub async fn start_game(&self, room_code: &str, caller_id: &str) -> Result<String> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(room_code)
            .ok_or_else(|| Error::RoomNotFound(room_code.to_string()))?;

        if room.host != caller_id {
            return Err(Error::NotHost);
        }
        if room.status != RoomStatus::Waiting {
            return Err(Error::GameAlreadyStarted);
        }
        if room.players.len() < self.config.min_players {
            return Err(Error::NotEnoughPlayers(self.config.min_players));
        }

        let players: Vec<Player> = room
            .players
            .iter()
            .zip(PlayerColor::ALL)
            .map(|(user_id, color)| Player::new(user_id.clone(), color))
            .collect();
        let state = GameState::new(room.game_id.clone(), players);

        self.persist_game(&state).await?;
        room.status = RoomStatus::Playing;
        let snapshot = room.clone();
        self.persist_room(&snapshot).await?;

        let game_id = room.game_id.clone();
        drop(rooms);

        self.games.write().await.insert(
            game_id.clone(),
            Arc::new(GameHandle {
                room_code: room_code.to_string(),
                state: Mutex::new(state),
            }),
        );

        info!(room_code, game_id = %game_id, "game started");
        self.broadcast(RoomEvent::GameStarted {
            room_code: room_code.to_string(),
            game_id: game_id.clone(),
        });
        Ok(game_id)
    }

    /// Roll the dice for the active player: uniform in `1..=6`
    pub async fn roll_dice(&self, game_id: &str, player_id: &str) -> Result<(u8, RollOutcome)> {
        let value = fastrand::u8(1..=ENTRY_ROLL);
        let outcome = self.apply_dice(game_id, player_id, value).await?;
        Ok((value, outcome))
    }

    /// Apply a known dice value. Replay and deterministic tests drive
    /// this directly; [`Self::roll_dice`] is the production entry.
    pub async fn apply_dice(
        &self,
        game_id: &str,
        player_id: &str,
        value: u8,
    ) -> Result<RollOutcome> {
        let handle = self.game_handle(game_id).await?;
        let mut state = handle.state.lock().await;

        if state.status != GameStatus::Playing {
            return Err(Error::GameNotActive);
        }
        if state.current().user_id != player_id {
            return Err(Error::NotYourTurn);
        }

        let outcome = apply_roll(&mut state, value)?;
        self.persist_game(&state).await?;
        drop(state);

        debug!(game_id, player_id, value, "dice applied");
        self.broadcast(RoomEvent::DiceRolled {
            game_id: game_id.to_string(),
            user_id: player_id.to_string(),
            value,
            passed: matches!(outcome, RollOutcome::Passed { .. }),
        });
        Ok(outcome)
    }

    /// Apply a move for the active player. On a finishing move the room
    /// flips to `Finished` and the game-end event carries the winner so
    /// settlement (tournament prize distribution) can run.
    pub async fn make_move(
        &self,
        game_id: &str,
        player_id: &str,
        piece_id: u8,
    ) -> Result<MoveOutcome> {
        let handle = self.game_handle(game_id).await?;
        let mut state = handle.state.lock().await;

        if state.status != GameStatus::Playing {
            return Err(Error::GameNotActive);
        }
        let player_idx = state
            .player_index(player_id)
            .filter(|idx| *idx == state.current_player)
            .ok_or(Error::NotYourTurn)?;

        let outcome = apply_move(&mut state, player_idx, piece_id)?;
        self.persist_game(&state).await?;
        drop(state);

        self.broadcast(RoomEvent::MoveApplied {
            game_id: game_id.to_string(),
            user_id: player_id.to_string(),
            piece_id,
        });

        if let Some(winner) = &outcome.winner {
            self.finish_room(&handle.room_code, game_id, winner).await?;
        }
        Ok(outcome)
    }

    /// A read-only snapshot of a live game's state
    pub async fn game_state(&self, game_id: &str) -> Result<GameState> {
        let handle = self.game_handle(game_id).await?;
        let state = handle.state.lock().await;
        Ok(state.clone())
    }

    /// A snapshot of a room
    pub async fn room(&self, room_code: &str) -> Result<Room> {
        self.rooms
            .read()
            .await
            .get(room_code)
            .cloned()
            .ok_or_else(|| Error::RoomNotFound(room_code.to_string()))
    }

    async fn finish_room(&self, room_code: &str, game_id: &str, winner: &str) -> Result<()> {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(room_code) {
            room.status = RoomStatus::Finished;
            let snapshot = room.clone();
            self.persist_room(&snapshot).await?;
        }
        drop(rooms);

        info!(room_code, game_id, winner, "game ended");
        self.notifier
            .send_local("Game over", &format!("{} won the match", winner))
            .await;
        self.broadcast(RoomEvent::GameEnded {
            room_code: room_code.to_string(),
            game_id: game_id.to_string(),
            winner: winner.to_string(),
        });
        Ok(())
    }

    async fn game_handle(&self, game_id: &str) -> Result<Arc<GameHandle>> {
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| Error::GameNotFound(game_id.to_string()))
    }

    async fn persist_room(&self, room: &Room) -> Result<()> {
        let value = serde_json::to_value(room)?;
        self.store.write(&room_key(&room.room_code), value).await
    }

    async fn persist_game(&self, state: &GameState) -> Result<()> {
        let value = serde_json::to_value(state)?;
        self.store.write(&game_key(&state.game_id), value).await
    }

    fn broadcast(&self, event: RoomEvent) {
        // Send fails only when nobody is subscribed
        let _ = self.event_tx.send(event);
    }
}

fn room_key(room_code: &str) -> String {
    format!("rooms/{}", room_code)
}

fn game_key(game_id: &str) -> String {
    format!("games/{}", game_id)
}

fn generate_room_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..ROOM_CODE_CHARSET.len());
            ROOM_CODE_CHARSET[idx] as char
        })
        .collect()
}
