use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Missing required parameter {name}")]
    MissingParameter { name: String },

    #[error("{kind} {name} already exists")]
    DuplicateResource { kind: &'static str, name: String },

    #[error("Insufficient credits. Need {needed}, have {available}.")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("No region selected. Click on a region first.")]
    NoSelection,

    #[error("Unknown region: {id}")]
    UnknownRegion { id: String },

    #[error("Unknown service: {name}")]
    UnknownService { name: String },

    #[error("Unknown command: {command}. Type 'help' for available commands.")]
    UnrecognizedCommand { command: String },

    #[error("{what} not implemented yet.")]
    NotImplemented { what: String },

    #[error("{service} is already deployed.")]
    AlreadyDeployed { service: String },

    #[error("Cannot start {action} while {activity} is in progress")]
    Busy { action: &'static str, activity: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GameError {
    /// True for rule violations a player can cause; false for
    /// infrastructure failures that should propagate.
    pub fn is_rule_violation(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Other(_)
        )
    }
}

pub type GameResult<T> = Result<T, GameError>;
