//! # LudoRoll
//!
//! Real-money Ludo gaming core: board geometry and movement rules, a
//! dice/turn arbiter, room and match lifecycle management, a
//! single-elimination tournament engine, an append-only wallet ledger
//! with payment integration, and the Mines and Limbo mini-games.
//!
//! ## Architecture
//!
//! - game: pure rules engine with board constants, piece positions,
//!   legal-move computation, and the turn state machine
//! - room: room codes, membership, host transfer, and the
//!   persist-then-broadcast match loop
//! - tournament: bracket construction, bye collapse, winner
//!   propagation, and prize distribution
//! - wallet: non-negative balances with a paired transaction record
//!   for every mutation
//! - payments: deposit/withdrawal flows over a pluggable gateway
//! - storage: remote store and notifier abstractions with in-memory
//!   implementations
//! - minigames: Mines and Limbo payout state machines
//!
//! The rules engine is deterministic and synchronous; everything above
//! it is async and serializes mutations per room, per game, and per
//! wallet account.

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod minigames;
pub mod payments;
pub mod room;
pub mod storage;
pub mod tournament;
pub mod wallet;

pub use config::Config;
pub use error::{Error, ErrorCategory, Result};
pub use game::{GameState, GameStatus, PlayerColor, Position};
pub use room::{RoomEvent, RoomManager, RoomSettings, RoomStatus};
pub use storage::{LocalCache, LogNotifier, MemoryStore, Notifier, RemoteStore};
pub use tournament::{TournamentManager, TournamentSpec, TournamentStatus};
pub use wallet::{BalanceOp, Transaction, TransactionStatus, WalletLedger};

/// Crate version from the build manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
