//! Configuration management for LudoRoll
//!
//! Centralized, validated configuration covering the game rules surface,
//! room lifecycle, tournament economics and wallet limits. Loadable from
//! TOML with sane defaults for every section.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub room: RoomConfig,
    #[serde(default)]
    pub tournament: TournamentConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Game rules configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Maximum die face; a roll of this value grants an extra turn
    pub die_faces: u8,
    /// Turn timeout before a forced pass, in seconds
    pub turn_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            die_faces: 6,
            turn_timeout_secs: 30,
        }
    }
}

/// Room lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Length of generated room codes
    pub room_code_len: usize,
    /// Default player cap for new rooms
    pub default_max_players: usize,
    /// Minimum players required to start a game
    pub min_players: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_code_len: 6,
            default_max_players: 4,
            min_players: 2,
        }
    }
}

/// Tournament economics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Platform fee withheld from the prize pool, in percent
    pub platform_fee_percent: u64,
    /// Winner share of the net pool, in percent
    pub winner_share_percent: u64,
    /// Second-place share, paid when participants >= second_place_min
    pub second_share_percent: u64,
    pub second_place_min: usize,
    /// Third-place share, paid when participants >= third_place_min
    pub third_share_percent: u64,
    pub third_place_min: usize,
    /// Minimum participants required to start
    pub min_participants: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            platform_fee_percent: 10,
            winner_share_percent: 70,
            second_share_percent: 20,
            second_place_min: 4,
            third_share_percent: 10,
            third_place_min: 8,
            min_participants: 2,
        }
    }
}

/// Wallet and payment bounds configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub min_deposit: u64,
    pub max_deposit: u64,
    pub min_withdrawal: u64,
    pub max_withdrawal: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            min_deposit: 10,
            max_deposit: 100_000,
            min_withdrawal: 100,
            max_withdrawal: 50_000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.game.die_faces < 2 {
            return Err(Error::Config("die_faces must be at least 2".to_string()));
        }
        if self.room.min_players < 2 {
            return Err(Error::Config("min_players must be at least 2".to_string()));
        }
        if self.room.default_max_players > 4 {
            return Err(Error::Config(
                "default_max_players cannot exceed the 4-color palette".to_string(),
            ));
        }
        if self.room.min_players > self.room.default_max_players {
            return Err(Error::Config(
                "min_players cannot exceed default_max_players".to_string(),
            ));
        }
        let t = &self.tournament;
        if t.platform_fee_percent >= 100 {
            return Err(Error::Config(
                "platform_fee_percent must be below 100".to_string(),
            ));
        }
        if t.winner_share_percent + t.second_share_percent + t.third_share_percent > 100 {
            return Err(Error::Config(
                "prize shares cannot exceed 100 percent of the pool".to_string(),
            ));
        }
        if self.wallet.min_withdrawal > self.wallet.max_withdrawal {
            return Err(Error::Config(
                "min_withdrawal cannot exceed max_withdrawal".to_string(),
            ));
        }
        if self.wallet.min_deposit > self.wallet.max_deposit {
            return Err(Error::Config(
                "min_deposit cannot exceed max_deposit".to_string(),
            ));
        }
        Ok(())
    }
}
