//! Interactive session: operator answers and the build readiness gate.
//!
//! All answers live in one [`SessionState`] owned by the collector loop.
//! Nothing is persisted; the state is dropped when the session ends.

mod collector;
mod menu;
mod prompt;

pub use collector::{Collector, Outcome, Preflight};
pub use menu::MenuItem;
pub use prompt::{LinePrompter, Prompter, TerminalPrompter};

use std::fmt;

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};

use crate::config::VlanDefinition;
use crate::plan::Profile;
use crate::topology::{EdgePorts, Uplink};

/// Syslog severity as configured on EXOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    DebugSummary,
}

impl Severity {
    /// Map a numeric level (2-7) to a severity; anything else is `Info`.
    pub fn from_level(level: u8) -> Self {
        match level {
            2 => Self::Critical,
            3 => Self::Error,
            4 => Self::Warning,
            5 => Self::Notice,
            7 => Self::DebugSummary,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::DebugSummary => "debug-summary",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to the stack pre-flight question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAck {
    /// A single switch.
    Standalone,
    /// More than one switch, stacking already enabled.
    Stack,
}

#[derive(Debug, Default)]
pub struct SwitchIdentity {
    pub ip: Option<String>,
    pub gateway: Option<String>,
    pub hostname: Option<String>,
    pub location: Option<String>,
}

impl SwitchIdentity {
    /// Store the management IP and derive the gateway (`.254` in the same /24).
    ///
    /// The address is not validated. Input without a fourth dotted field
    /// clears the gateway so the build gate catches it.
    pub fn set_ip(&mut self, ip: &str) {
        let ip = ip.trim();
        self.gateway = derive_gateway(ip);
        self.ip = Some(ip.to_string());
    }
}

/// Replace the last occurrence of the fourth dotted field with `254`.
pub fn derive_gateway(ip: &str) -> Option<String> {
    let host = ip.split('.').nth(3)?;
    let at = ip.rfind(host)?;
    Some(format!("{}254{}", &ip[..at], &ip[at + host.len()..]))
}

#[derive(Debug)]
pub struct ManagementCredentials {
    pub snmp_auth: Option<SecretString>,
    pub snmp_priv: Option<SecretString>,
    pub syslog_ip: Option<String>,
    pub facility: String,
    pub severity: Severity,
    pub radius_primary: Option<String>,
    pub radius_secondary: Option<String>,
    pub radius_secret: Option<SecretString>,
    /// Already hashed; the plaintext is never kept.
    pub admin_password: Option<String>,
}

impl ManagementCredentials {
    pub fn new(facility: impl Into<String>, severity: Severity) -> Self {
        Self {
            snmp_auth: None,
            snmp_priv: None,
            syslog_ip: None,
            facility: facility.into(),
            severity,
            radius_primary: None,
            radius_secondary: None,
            radius_secret: None,
            admin_password: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct StackTopology {
    pub acknowledged: Option<StackAck>,
    pub switch_count: Option<u8>,
    pub edge_ports: Option<EdgePorts>,
    pub ports: Option<String>,
    pub uplink: Option<Uplink>,
}

impl StackTopology {
    /// Forget the switch count and everything derived from it.
    pub fn reset_count(&mut self) {
        self.switch_count = None;
        self.edge_ports = None;
        self.ports = None;
    }
}

/// VLAN name to tag, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanSet(IndexMap<String, u16>);

impl VlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tag: u16) {
        self.0.insert(name.into(), tag);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.0.iter().map(|(name, tag)| (name.as_str(), *tag))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[VlanDefinition]> for VlanSet {
    fn from(vlans: &[VlanDefinition]) -> Self {
        Self(vlans.iter().map(|v| (v.name.clone(), v.tag)).collect())
    }
}

/// Everything collected during one session.
#[derive(Debug)]
pub struct SessionState {
    pub profile: Profile,
    pub identity: SwitchIdentity,
    pub credentials: ManagementCredentials,
    pub topology: StackTopology,
    pub vlans: VlanSet,
}

impl SessionState {
    pub fn new(profile: Profile, facility: impl Into<String>, severity: Severity) -> Self {
        Self {
            profile,
            identity: SwitchIdentity::default(),
            credentials: ManagementCredentials::new(facility, severity),
            topology: StackTopology::default(),
            vlans: VlanSet::new(),
        }
    }

    /// Check the build gate.
    ///
    /// Returns borrowed build inputs when every field the profile needs is
    /// set, otherwise the names of the missing fields.
    pub fn readiness(&self) -> Result<BuildInputs<'_>, Vec<&'static str>> {
        let mut missing = Vec::new();

        let switch_ip = require(&mut missing, "switch IP", self.identity.ip.as_deref());
        let gateway_ip = require(&mut missing, "gateway", self.identity.gateway.as_deref());
        let hostname = require(&mut missing, "hostname", self.identity.hostname.as_deref());
        let switch_count = require(&mut missing, "switch quantity", self.topology.switch_count);
        let ports = require(&mut missing, "edge ports", self.topology.ports.as_deref());

        let management = match self.profile {
            Profile::Compact => None,
            Profile::Full => {
                let c = &self.credentials;
                let location = require(&mut missing, "location", self.identity.location.as_deref());
                let snmp_auth = require(&mut missing, "SNMP auth", secret(&c.snmp_auth));
                let snmp_priv = require(&mut missing, "SNMP priv", secret(&c.snmp_priv));
                let syslog_ip = require(&mut missing, "syslog IP", c.syslog_ip.as_deref());
                let radius_primary =
                    require(&mut missing, "RADIUS primary", c.radius_primary.as_deref());
                let radius_secondary =
                    require(&mut missing, "RADIUS secondary", c.radius_secondary.as_deref());
                let radius_secret = require(&mut missing, "RADIUS secret", secret(&c.radius_secret));
                let admin_password =
                    require(&mut missing, "admin password", c.admin_password.as_deref());
                let uplink = require(&mut missing, "uplink", self.topology.uplink.as_ref());
                if c.facility.is_empty() {
                    missing.push("syslog facility");
                }

                match (
                    location,
                    snmp_auth,
                    snmp_priv,
                    syslog_ip,
                    radius_primary,
                    radius_secondary,
                    radius_secret,
                    admin_password,
                    uplink,
                ) {
                    (
                        Some(location),
                        Some(snmp_auth),
                        Some(snmp_priv),
                        Some(syslog_ip),
                        Some(radius_primary),
                        Some(radius_secondary),
                        Some(radius_secret),
                        Some(admin_password),
                        Some(uplink),
                    ) => Some(Management {
                        location,
                        snmp_auth,
                        snmp_priv,
                        syslog_ip,
                        facility: &c.facility,
                        severity: c.severity,
                        radius_primary,
                        radius_secondary,
                        radius_secret,
                        admin_password,
                        uplink,
                    }),
                    _ => None,
                }
            }
        };

        if !missing.is_empty() {
            return Err(missing);
        }

        match (switch_ip, gateway_ip, hostname, switch_count, ports) {
            (Some(switch_ip), Some(gateway_ip), Some(hostname), Some(switch_count), Some(ports)) => {
                Ok(BuildInputs {
                    profile: self.profile,
                    switch_ip,
                    gateway_ip,
                    hostname,
                    switch_count,
                    ports,
                    vlans: &self.vlans,
                    management,
                })
            }
            _ => Err(missing),
        }
    }
}

fn require<T>(missing: &mut Vec<&'static str>, name: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn secret(value: &Option<SecretString>) -> Option<&str> {
    value
        .as_ref()
        .map(|s| s.expose_secret())
        .filter(|s| !s.is_empty())
}

/// Borrowed, complete set of answers the command plan is built from.
#[derive(Debug)]
pub struct BuildInputs<'a> {
    pub profile: Profile,
    pub switch_ip: &'a str,
    pub gateway_ip: &'a str,
    pub hostname: &'a str,
    pub switch_count: u8,
    pub ports: &'a str,
    pub vlans: &'a VlanSet,
    /// Present for the full profile.
    pub management: Option<Management<'a>>,
}

/// Full-profile management settings.
#[derive(Debug)]
pub struct Management<'a> {
    pub location: &'a str,
    pub snmp_auth: &'a str,
    pub snmp_priv: &'a str,
    pub syslog_ip: &'a str,
    pub facility: &'a str,
    pub severity: Severity,
    pub radius_primary: &'a str,
    pub radius_secondary: &'a str,
    pub radius_secret: &'a str,
    pub admin_password: &'a str,
    pub uplink: &'a Uplink,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Medium;

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::from(value.to_string()))
    }

    fn full_state() -> SessionState {
        let mut state = SessionState::new(Profile::Full, "local4", Severity::Info);
        state.identity.set_ip("10.1.2.3");
        state.identity.hostname = Some("hmd-sw1".into());
        state.identity.location = Some("idf2".into());
        state.credentials.snmp_auth = secret("authkey1");
        state.credentials.snmp_priv = secret("privkey1");
        state.credentials.syslog_ip = Some("10.0.0.3".into());
        state.credentials.radius_primary = Some("10.0.0.1".into());
        state.credentials.radius_secondary = Some("10.0.0.2".into());
        state.credentials.radius_secret = secret("radsecret");
        state.credentials.admin_password = Some("$5$abcdef$hash".into());
        state.topology.switch_count = Some(1);
        state.topology.edge_ports = Some(EdgePorts::TwentyFour);
        state.topology.ports = Some("1-24".into());
        state.topology.uplink = Some(Uplink {
            ports: "10".into(),
            medium: Medium::Copper,
        });
        state
    }

    #[test]
    fn test_gateway_derivation() {
        assert_eq!(derive_gateway("10.1.2.3").as_deref(), Some("10.1.2.254"));
        assert_eq!(derive_gateway("192.168.10.10").as_deref(), Some("192.168.10.254"));
        // Last occurrence of the host field is replaced.
        assert_eq!(derive_gateway("10.10.10.10").as_deref(), Some("10.10.10.254"));
        assert_eq!(derive_gateway("10.1.2"), None);
        assert_eq!(derive_gateway("garbage"), None);
    }

    #[test]
    fn test_malformed_ip_leaves_gateway_unset() {
        let mut identity = SwitchIdentity::default();
        identity.set_ip("10.1.2.3");
        assert_eq!(identity.gateway.as_deref(), Some("10.1.2.254"));
        identity.set_ip("10.1");
        assert_eq!(identity.ip.as_deref(), Some("10.1"));
        assert!(identity.gateway.is_none());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(Severity::from_level(2).as_str(), "critical");
        assert_eq!(Severity::from_level(6).as_str(), "info");
        assert_eq!(Severity::from_level(7).as_str(), "debug-summary");
        assert_eq!(Severity::from_level(1), Severity::Info);
        assert_eq!(Severity::from_level(42), Severity::Info);
    }

    #[test]
    fn test_full_state_is_ready() {
        let state = full_state();
        let inputs = state.readiness().unwrap();
        assert_eq!(inputs.gateway_ip, "10.1.2.254");
        let management = inputs.management.unwrap();
        assert_eq!(management.snmp_auth, "authkey1");
        assert_eq!(management.severity, Severity::Info);
    }

    #[test]
    fn test_empty_state_lists_everything_missing() {
        let state = SessionState::new(Profile::Full, "local4", Severity::Info);
        let missing = state.readiness().unwrap_err();
        assert!(missing.contains(&"switch IP"));
        assert!(missing.contains(&"RADIUS secret"));
        assert!(missing.contains(&"uplink"));
    }

    #[test]
    fn test_each_field_blocks_build() {
        let clears: Vec<fn(&mut SessionState)> = vec![
            |s: &mut SessionState| s.identity.ip = None,
            |s: &mut SessionState| s.identity.gateway = None,
            |s: &mut SessionState| s.identity.hostname = None,
            |s: &mut SessionState| s.identity.location = None,
            |s: &mut SessionState| s.credentials.snmp_auth = None,
            |s: &mut SessionState| s.credentials.snmp_priv = None,
            |s: &mut SessionState| s.credentials.syslog_ip = None,
            |s: &mut SessionState| s.credentials.radius_primary = None,
            |s: &mut SessionState| s.credentials.radius_secondary = None,
            |s: &mut SessionState| s.credentials.radius_secret = None,
            |s: &mut SessionState| s.credentials.admin_password = None,
            |s: &mut SessionState| s.credentials.facility.clear(),
            |s: &mut SessionState| s.topology.reset_count(),
            |s: &mut SessionState| s.topology.uplink = None,
        ];
        for clear in clears {
            let mut state = full_state();
            clear(&mut state);
            assert!(state.readiness().is_err());
        }
    }

    #[test]
    fn test_readiness_is_stable_until_reset() {
        let mut state = full_state();
        assert!(state.readiness().is_ok());
        // Unrelated edits keep the gate open.
        state.vlans.insert("Staff", 10);
        state.credentials.severity = Severity::Warning;
        assert!(state.readiness().is_ok());
        assert!(state.readiness().is_ok());
        state.topology.reset_count();
        assert!(state.readiness().is_err());
    }

    #[test]
    fn test_compact_needs_only_basics() {
        let mut state = SessionState::new(Profile::Compact, "local4", Severity::Info);
        state.identity.set_ip("10.9.8.7");
        state.identity.hostname = Some("core-stack".into());
        assert_eq!(
            state.readiness().unwrap_err(),
            vec!["switch quantity", "edge ports"]
        );
        state.topology.switch_count = Some(2);
        state.topology.ports = Some("1:1-48,2:1-48".into());
        let inputs = state.readiness().unwrap();
        assert!(inputs.management.is_none());
    }
}
