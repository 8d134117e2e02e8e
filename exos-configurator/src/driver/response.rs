//! Result of one command.

use std::time::Duration;

/// Output of a command the switch accepted.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command as it may be logged (secrets masked).
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Output as read from the shell, secrets masked.
    pub raw_result: String,

    /// The prompt that ended the output.
    pub prompt: String,

    pub elapsed: Duration,

    /// Set when the output contained one of the platform's failure markers.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// An empty successful response, as returned by backends that do not
    /// talk to a switch.
    pub fn empty(command: impl Into<String>) -> Self {
        Self::new(command, "", "", "", Duration::ZERO)
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}
