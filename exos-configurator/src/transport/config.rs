//! SSH connection settings.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Learn unknown keys, reject changed ones.
    #[default]
    AcceptNew,

    /// Accept any key. Lab use only.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Switch management address or hostname.
    pub host: String,

    pub port: u16,

    pub username: String,

    pub auth: AuthMethod,

    /// Connect timeout and default per-command read timeout.
    pub timeout: Duration,

    pub terminal_width: u32,

    pub terminal_height: u32,

    pub host_key_verification: HostKeyVerification,

    /// Overrides `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How to authenticate to the switch.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(SecretString),

    PrivateKey {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}
