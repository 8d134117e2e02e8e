//! Site configuration.
//!
//! Everything the command templates need that is not asked interactively:
//! the hostname-to-site table that picks syslog and RADIUS servers, the
//! default VLAN set, contact/time settings and the firmware target.
//!
//! Values are layered with figment: built-in defaults, then a TOML file,
//! then `EXOS_CFG_*` environment variables (`__` separates nested keys).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "EXOS_CFG_";

/// Top-level site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// SNMP sysContact.
    #[serde(default = "default_contact")]
    pub contact: String,

    #[serde(default)]
    pub time: TimeSettings,

    #[serde(default)]
    pub syslog: SyslogDefaults,

    /// Ordered hostname-substring table; first match wins.
    ///
    /// Not serialized into the defaults layer so a file replaces the table
    /// instead of being merged into it.
    #[serde(default = "default_sites", skip_serializing)]
    pub sites: Vec<SiteRoute>,

    /// Default VLAN set, in creation order.
    #[serde(default = "default_vlans", skip_serializing)]
    pub vlans: Vec<VlanDefinition>,

    #[serde(default)]
    pub firmware: Option<FirmwareTarget>,

    /// Pre-login banner text, if any.
    #[serde(default)]
    pub banner: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact: default_contact(),
            time: TimeSettings::default(),
            syslog: SyslogDefaults::default(),
            sites: default_sites(),
            vlans: default_vlans(),
            firmware: None,
            banner: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSettings {
    /// Arguments to `configure timezone`.
    pub timezone: String,
    pub sntp_primary: String,
    pub sntp_secondary: String,
    /// NTP server used by the compact profile.
    pub ntp_server: String,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            timezone: "name CST -360 autodst name CDT begins every second sunday march at 2 0 ends every first sunday november at 2 0".into(),
            sntp_primary: "10.1.1.1".into(),
            sntp_secondary: "10.1.1.2".into(),
            ntp_server: "pool.ntp.org".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyslogDefaults {
    pub facility: String,
    /// Severity level 2-7.
    pub severity: u8,
}

impl Default for SyslogDefaults {
    fn default() -> Self {
        Self {
            facility: "local4".into(),
            severity: 6,
        }
    }
}

/// Role addresses selected when a hostname contains `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRoute {
    pub pattern: String,
    pub syslog: String,
    pub radius_primary: String,
    pub radius_secondary: String,
}

/// One `[[vlans]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanDefinition {
    pub name: String,
    pub tag: u16,
}

impl VlanDefinition {
    pub fn new(name: impl Into<String>, tag: u16) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareTarget {
    /// Version string expected in `show version` once upgraded.
    pub version: String,
    /// URL passed to `download url`.
    pub url: String,
    /// How long `download url` may run before the session gives up on it.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_download_timeout() -> u64 {
    30 * 60
}

fn default_contact() -> String {
    "hostmaster@example.com".into()
}

fn default_sites() -> Vec<SiteRoute> {
    vec![
        SiteRoute {
            pattern: "hmd".into(),
            syslog: "10.0.0.3".into(),
            radius_primary: "10.0.0.1".into(),
            radius_secondary: "10.0.0.2".into(),
        },
        SiteRoute {
            pattern: "wst".into(),
            syslog: "10.0.0.4".into(),
            radius_primary: "10.0.0.2".into(),
            radius_secondary: "10.0.0.1".into(),
        },
    ]
}

fn default_vlans() -> Vec<VlanDefinition> {
    vec![
        VlanDefinition::new("Staff", 10),
        VlanDefinition::new("Student", 5),
        VlanDefinition::new("AV", 15),
        VlanDefinition::new("VoIP", 99),
    ]
}

impl SiteConfig {
    /// Load the layered configuration.
    ///
    /// An explicit `path` must exist; without one the platform config
    /// directory is consulted and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Validation {
                        field: "config".into(),
                        reason: format!("{} does not exist", path.display()),
                    });
                }
                debug!("loading site config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    debug!("loading site config from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// First site whose pattern occurs in `hostname` (case-insensitive).
    pub fn route_for(&self, hostname: &str) -> Option<&SiteRoute> {
        let hostname = hostname.to_lowercase();
        self.sites
            .iter()
            .find(|site| hostname.contains(&site.pattern.to_lowercase()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=7).contains(&self.syslog.severity) {
            return Err(ConfigError::Validation {
                field: "syslog.severity".into(),
                reason: format!("{} is outside 2-7", self.syslog.severity),
            });
        }
        if let Some(site) = self.sites.iter().find(|s| s.pattern.is_empty()) {
            return Err(ConfigError::Validation {
                field: "sites.pattern".into(),
                reason: format!("empty pattern for syslog {}", site.syslog),
            });
        }
        for (i, vlan) in self.vlans.iter().enumerate() {
            if self.vlans[..i].iter().any(|v| v.name == vlan.name) {
                return Err(ConfigError::Validation {
                    field: "vlans.name".into(),
                    reason: format!("VLAN {} is defined twice", vlan.name),
                });
            }
        }
        Ok(())
    }
}

/// `<config dir>/exos-configurator/site.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "exos-configurator").map(|dirs| dirs.config_dir().join("site.toml"))
}
