//! Error types and handling for LudoRoll
//!
//! All fallible operations in the crate return [`Result`] with a typed
//! [`Error`]. Errors carry stable codes and categories so callers can
//! route them to telemetry without matching on every variant.

use thiserror::Error;

/// Result type alias for LudoRoll operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad input shape; rejected synchronously, no state change
    Validation,
    /// State does not permit the operation; rejected, no state change
    Precondition,
    /// Remote store, notifier or payment gateway failure
    External,
    /// Wallet and money-movement errors
    Wallet,
    /// Internal invariant violations and serialization failures
    Internal,
}

impl ErrorCategory {
    /// Severity level used when surfacing to alerting
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Wallet | Self::Internal => ErrorSeverity::High,
            Self::External => ErrorSeverity::Medium,
            Self::Validation | Self::Precondition => ErrorSeverity::Low,
        }
    }

    /// Whether callers may retry the failed operation as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::External)
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

/// LudoRoll error types
#[derive(Debug, Error)]
pub enum Error {
    // Room lifecycle
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room is full")]
    RoomFull,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Player already in room")]
    AlreadyInRoom,

    #[error("Only the host may perform this action")]
    NotHost,

    #[error("Not enough players to start (need at least {0})")]
    NotEnoughPlayers(usize),

    // Game state
    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Game is not active")]
    GameNotActive,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid roll: {0}")]
    InvalidRoll(String),

    // Tournament
    #[error("Tournament not found: {0}")]
    TournamentNotFound(String),

    #[error("Tournament is not open for registration")]
    TournamentNotOpen,

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Already registered in tournament")]
    AlreadyRegistered,

    #[error("Tournament already completed")]
    TournamentCompleted,

    // Wallet and payments
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(String),

    // Validation
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // External collaborators
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Internal
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("TOML error: {}", err))
    }
}

impl Error {
    /// Stable error code for telemetry
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "E001",
            Self::RoomFull => "E002",
            Self::GameAlreadyStarted => "E003",
            Self::AlreadyInRoom => "E004",
            Self::NotHost => "E005",
            Self::NotEnoughPlayers(_) => "E006",
            Self::GameNotFound(_) => "E007",
            Self::GameNotActive => "E008",
            Self::NotYourTurn => "E009",
            Self::InvalidMove(_) => "E010",
            Self::InvalidRoll(_) => "E011",
            Self::TournamentNotFound(_) => "E012",
            Self::TournamentNotOpen => "E013",
            Self::TournamentFull => "E014",
            Self::AlreadyRegistered => "E015",
            Self::TournamentCompleted => "E016",
            Self::InsufficientBalance { .. } => "E017",
            Self::PaymentFailed(_) => "E018",
            Self::WithdrawalNotFound(_) => "E019",
            Self::Validation(_) | Self::InvalidInput(_) => "E020",
            Self::Storage(_) => "E021",
            Self::Serialization(_) => "E022",
            Self::Config(_) => "E023",
            Self::InvalidState(_) => "E024",
            Self::Internal(_) => "E025",
        }
    }

    /// Error category for monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) | Self::Config(_) => {
                ErrorCategory::Validation
            }
            Self::RoomNotFound(_)
            | Self::RoomFull
            | Self::GameAlreadyStarted
            | Self::AlreadyInRoom
            | Self::NotHost
            | Self::NotEnoughPlayers(_)
            | Self::GameNotFound(_)
            | Self::GameNotActive
            | Self::NotYourTurn
            | Self::InvalidMove(_)
            | Self::InvalidRoll(_)
            | Self::TournamentNotFound(_)
            | Self::TournamentNotOpen
            | Self::TournamentFull
            | Self::AlreadyRegistered
            | Self::TournamentCompleted => ErrorCategory::Precondition,
            Self::InsufficientBalance { .. }
            | Self::PaymentFailed(_)
            | Self::WithdrawalNotFound(_) => ErrorCategory::Wallet,
            Self::Storage(_) => ErrorCategory::External,
            Self::Serialization(_) | Self::InvalidState(_) | Self::Internal(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Severity shortcut for alerting
    pub fn severity(&self) -> ErrorSeverity {
        self.category().severity()
    }

    /// Whether callers may retry the failed operation as-is
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Create an insufficient balance error
    pub fn insufficient_balance_for(required: u64, available: u64) -> Self {
        Error::InsufficientBalance {
            required,
            available,
        }
    }
}
