//! Command definitions
//!
//! Represents commands read by the shell.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Put,
    Delete,
    Stats,
    ResetStats,
    Ping,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Insert a new key-value pair (no overwrite)
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },

    /// Report page access counters
    Stats,

    /// Zero page access counters
    ResetStats,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::Delete { .. } => CommandType::Delete,
            Command::Stats => CommandType::Stats,
            Command::ResetStats => CommandType::ResetStats,
            Command::Ping => CommandType::Ping,
        }
    }
}
