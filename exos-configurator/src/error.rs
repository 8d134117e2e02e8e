//! Error types for exos-configurator.

use std::io;
use thiserror::Error;

/// Main error type for configurator operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// The switch rejected a command
    #[error("Command rejected: {command}: {message}")]
    CommandRejected { command: String, message: String },

    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Command template could not be rendered
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Site configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terminal I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True when the session to the switch can no longer carry commands.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::NotConnected
                | Self::Channel(ChannelError::Closed | ChannelError::Desynchronized | ChannelError::Ssh(_))
        )
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Shell channel errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt was not seen within the read timeout
    #[error("Prompt not found within {0:?}")]
    PatternTimeout(std::time::Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// The shell never came back to a prompt after a timeout
    #[error("Shell output out of step with commands, session abandoned")]
    Desynchronized,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Command template rendering errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder has no value in the variable set
    #[error("no value for placeholder '{{{name}}}' in '{template}'")]
    MissingVariable { name: String, template: String },
}

/// Site configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Layered config could not be extracted
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    /// A value was present but unusable
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Result type alias using the configurator's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_session_lost_classification() {
        assert!(Error::from(ChannelError::Desynchronized).is_session_lost());
        assert!(Error::from(ChannelError::Closed).is_session_lost());
        assert!(Error::NotConnected.is_session_lost());
        assert!(!Error::from(ChannelError::PatternTimeout(Duration::from_secs(30))).is_session_lost());
        assert!(
            !Error::CommandRejected {
                command: "enable bogus".into(),
                message: "Error: Invalid input".into(),
            }
            .is_session_lost()
        );
    }
}
