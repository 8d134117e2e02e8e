//! Builder for [`ExosDriver`].

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::exos::ExosDriver;
use crate::error::{ConfigError, Result};
use crate::platform::{self, PlatformDefinition};
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for an SSH-backed driver.
///
/// ```rust,no_run
/// use exos_configurator::driver::DriverBuilder;
/// use secrecy::SecretString;
///
/// # async fn example() -> Result<(), exos_configurator::Error> {
/// let mut driver = DriverBuilder::new("10.1.2.3")
///     .username("admin")
///     .password(SecretString::from("secret".to_string()))
///     .build()?;
/// driver.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    platform: Option<PlatformDefinition>,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl DriverBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            platform: None,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.auth = Some(AuthMethod::Password(password));
        self
    }

    pub fn private_key(mut self, path: impl Into<PathBuf>, passphrase: Option<SecretString>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: path.into(),
            passphrase,
        });
        self
    }

    /// Use a platform other than stock EXOS.
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Connect timeout and per-command read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Create the driver without connecting.
    pub fn build(self) -> Result<ExosDriver> {
        let username = self.username.ok_or_else(|| ConfigError::Validation {
            field: "username".into(),
            reason: "a username is required".into(),
        })?;
        let auth = self.auth.ok_or_else(|| ConfigError::Validation {
            field: "auth".into(),
            reason: "a password or private key is required".into(),
        })?;

        let mut ssh_config = SshConfig::new(self.host, username, auth);
        ssh_config.port = self.port;
        ssh_config.timeout = self.timeout;
        ssh_config.host_key_verification = self.host_key_verification;
        ssh_config.known_hosts_path = self.known_hosts_path;

        let platform = self.platform.unwrap_or_else(platform::exos);
        Ok(ExosDriver::new(ssh_config, platform, self.timeout))
    }
}
