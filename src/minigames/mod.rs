//! Mines and Limbo mini-games
//!
//! Both games are self-contained payout state machines: the bet is
//! debited from the wallet up front and any winnings are credited back
//! through the same ledger, so the transaction log stays the single
//! source of truth for money movement.
//!
//! Mines reveals cells independently (no neighbor cascade); the
//! multiplier is the fair-odds inverse of the survival probability.
//! Limbo compares a drawn crash point against the player's target.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::wallet::{BalanceOp, WalletLedger};

/// Limbo house edge applied to the drawn crash point
const LIMBO_EDGE: f64 = 0.99;
/// Largest crash point Limbo will produce
const LIMBO_MAX_MULTIPLIER: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinesStatus {
    Active,
    Busted,
    CashedOut,
}

/// Result of revealing one cell
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    /// Safe cell; the running multiplier after this reveal
    Safe { multiplier: f64 },
    /// Hit a mine; the round is over and the bet is lost
    Mine,
}

/// One round of Mines for a single player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesGame {
    pub id: String,
    pub user_id: String,
    pub bet: u64,
    pub grid_size: u8,
    pub mine_count: u8,
    mines: HashSet<u8>,
    revealed: HashSet<u8>,
    pub status: MinesStatus,
}

impl MinesGame {
    /// Start a round, debiting the bet. Mine positions are drawn
    /// uniformly without replacement.
    pub async fn start(
        wallet: &WalletLedger,
        user_id: &str,
        bet: u64,
        grid_size: u8,
        mine_count: u8,
    ) -> Result<Self> {
        let cells = validate_board(grid_size, mine_count)?;
        if bet == 0 {
            return Err(Error::Validation("bet must be positive".to_string()));
        }

        let mut mines = HashSet::with_capacity(mine_count as usize);
        while mines.len() < mine_count as usize {
            mines.insert(fastrand::u8(0..cells));
        }
        Self::start_placed(wallet, user_id, bet, grid_size, mine_count, mines).await
    }

    /// Start with explicit mine positions; tests use this
    pub async fn start_placed(
        wallet: &WalletLedger,
        user_id: &str,
        bet: u64,
        grid_size: u8,
        mine_count: u8,
        mines: HashSet<u8>,
    ) -> Result<Self> {
        let cells = validate_board(grid_size, mine_count)?;
        if mines.len() != mine_count as usize || mines.iter().any(|&c| c >= cells) {
            return Err(Error::Validation("mine placement out of bounds".to_string()));
        }

        wallet
            .update_balance(user_id, bet, BalanceOp::Subtract, "mines bet".to_string())
            .await?;

        let game = Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            bet,
            grid_size,
            mine_count,
            mines,
            revealed: HashSet::new(),
            status: MinesStatus::Active,
        };
        info!(game_id = %game.id, user_id, bet, grid_size, mine_count, "mines round started");
        Ok(game)
    }

    /// Reveal a single cell. Cells are independent; a safe reveal never
    /// touches its neighbors.
    pub fn reveal(&mut self, cell: u8) -> Result<RevealOutcome> {
        if self.status != MinesStatus::Active {
            return Err(Error::InvalidState("round is over".to_string()));
        }
        let cells = self.grid_size as u16 * self.grid_size as u16;
        if u16::from(cell) >= cells {
            return Err(Error::InvalidInput(format!("cell {} out of bounds", cell)));
        }
        if self.revealed.contains(&cell) {
            return Err(Error::InvalidInput(format!("cell {} already revealed", cell)));
        }

        if self.mines.contains(&cell) {
            self.status = MinesStatus::Busted;
            debug!(game_id = %self.id, cell, "mine hit");
            return Ok(RevealOutcome::Mine);
        }

        self.revealed.insert(cell);
        Ok(RevealOutcome::Safe {
            multiplier: self.multiplier(),
        })
    }

    /// Fair-odds multiplier for the current reveal count: the inverse
    /// probability of surviving this many picks
    pub fn multiplier(&self) -> f64 {
        let cells = f64::from(self.grid_size) * f64::from(self.grid_size);
        let mines = f64::from(self.mine_count);
        let mut m = 1.0;
        for i in 0..self.revealed.len() {
            let i = i as f64;
            m *= (cells - i) / (cells - mines - i);
        }
        m
    }

    /// Cash out the current winnings. Requires at least one safe
    /// reveal; a busted round cannot cash out.
    pub async fn cash_out(&mut self, wallet: &WalletLedger) -> Result<u64> {
        if self.status != MinesStatus::Active {
            return Err(Error::InvalidState("round is over".to_string()));
        }
        if self.revealed.is_empty() {
            return Err(Error::InvalidState("nothing revealed yet".to_string()));
        }

        let payout = (self.bet as f64 * self.multiplier()) as u64;
        wallet
            .update_balance(
                &self.user_id,
                payout,
                BalanceOp::Add,
                "mines cash-out".to_string(),
            )
            .await?;
        self.status = MinesStatus::CashedOut;
        info!(game_id = %self.id, user_id = %self.user_id, payout, "mines cashed out");
        Ok(payout)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}

fn validate_board(grid_size: u8, mine_count: u8) -> Result<u8> {
    if !(3..=8).contains(&grid_size) {
        return Err(Error::Validation("grid size must be 3..=8".to_string()));
    }
    let cells = grid_size * grid_size;
    if mine_count == 0 || mine_count >= cells {
        return Err(Error::Validation(format!(
            "mine count must be between 1 and {}",
            cells - 1
        )));
    }
    Ok(cells)
}

/// Outcome of one Limbo bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimboOutcome {
    /// The drawn crash point
    pub result: f64,
    /// The multiplier the player asked for
    pub target: f64,
    /// Amount credited; zero on a loss
    pub payout: u64,
}

impl LimboOutcome {
    pub fn won(&self) -> bool {
        self.payout > 0
    }
}

/// Play one Limbo bet: debit the stake, draw a crash point, and credit
/// `bet * target` if the crash point reached the target.
pub async fn play_limbo(
    wallet: &WalletLedger,
    user_id: &str,
    bet: u64,
    target: f64,
) -> Result<LimboOutcome> {
    // fastrand::f64 is [0, 1); shift away from zero before inverting
    let roll = 1.0 - fastrand::f64();
    play_limbo_with_roll(wallet, user_id, bet, target, roll).await
}

/// Deterministic variant taking the uniform draw directly
pub async fn play_limbo_with_roll(
    wallet: &WalletLedger,
    user_id: &str,
    bet: u64,
    target: f64,
    roll: f64,
) -> Result<LimboOutcome> {
    if bet == 0 {
        return Err(Error::Validation("bet must be positive".to_string()));
    }
    if !(target > 1.0 && target <= LIMBO_MAX_MULTIPLIER) {
        return Err(Error::Validation(format!(
            "target must be in (1.0, {}]",
            LIMBO_MAX_MULTIPLIER
        )));
    }
    if !(roll > 0.0 && roll <= 1.0) {
        return Err(Error::InvalidInput("roll must be in (0, 1]".to_string()));
    }

    wallet
        .update_balance(user_id, bet, BalanceOp::Subtract, "limbo bet".to_string())
        .await?;

    let result = (LIMBO_EDGE / roll).clamp(1.0, LIMBO_MAX_MULTIPLIER);
    let payout = if result >= target {
        let amount = (bet as f64 * target) as u64;
        wallet
            .update_balance(user_id, amount, BalanceOp::Add, "limbo win".to_string())
            .await?;
        amount
    } else {
        0
    };

    info!(user_id, bet, target, result, payout, "limbo bet settled");
    Ok(LimboOutcome {
        result,
        target,
        payout,
    })
}
