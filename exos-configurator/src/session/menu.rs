//! Numbered menu for each profile.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use super::SessionState;
use crate::plan::{MASK, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    SwitchIp,
    Snmp,
    SwitchName,
    Syslog,
    Radius,
    RadiusSecret,
    AdminPassword,
    Switches,
    Uplink,
    Vlans,
    Build,
    Help,
    Exit,
}

const FULL_MENU: &[MenuItem] = &[
    MenuItem::SwitchIp,
    MenuItem::Snmp,
    MenuItem::Syslog,
    MenuItem::Radius,
    MenuItem::RadiusSecret,
    MenuItem::AdminPassword,
    MenuItem::Switches,
    MenuItem::Uplink,
    MenuItem::Vlans,
    MenuItem::Build,
    MenuItem::Help,
    MenuItem::Exit,
];

const COMPACT_MENU: &[MenuItem] = &[
    MenuItem::SwitchIp,
    MenuItem::SwitchName,
    MenuItem::Switches,
    MenuItem::Build,
    MenuItem::Exit,
];

impl MenuItem {
    /// Items offered by `profile`, in menu order.
    pub fn for_profile(profile: Profile) -> &'static [MenuItem] {
        match profile {
            Profile::Full => FULL_MENU,
            Profile::Compact => COMPACT_MENU,
        }
    }

    /// Parse a 1-based selection. Anything else is `None`.
    pub fn select(profile: Profile, input: &str) -> Option<MenuItem> {
        let n: usize = input.trim().parse().ok()?;
        let items = Self::for_profile(profile);
        n.checked_sub(1).and_then(|i| items.get(i)).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SwitchIp => "Switch IP",
            Self::Snmp => "SNMP",
            Self::SwitchName => "Switch Name",
            Self::Syslog => "Syslog",
            Self::Radius => "RADIUS",
            Self::RadiusSecret => "RADIUS Secret",
            Self::AdminPassword => "Admin password",
            Self::Switches => "Switches",
            Self::Uplink => "Uplink port(s)",
            Self::Vlans => "VLANs",
            Self::Build => "Build the configuration",
            Self::Help => "Report issues",
            Self::Exit => "Exit",
        }
    }

    /// Current values shown under the item, as `(label, value)` pairs.
    fn values(self, state: &SessionState) -> Vec<(&'static str, String)> {
        let mut values = Vec::new();
        let mut push = |label: &'static str, value: Option<&str>| {
            if let Some(value) = value {
                values.push((label, value.to_string()));
            }
        };

        let id = &state.identity;
        let c = &state.credentials;
        let t = &state.topology;
        match self {
            Self::SwitchIp => {
                push("IP", id.ip.as_deref());
                push("Gateway", id.gateway.as_deref());
            }
            Self::Snmp => {
                push("Auth", c.snmp_auth.as_ref().map(|_| MASK));
                push("Priv", c.snmp_priv.as_ref().map(|_| MASK));
                push("Name", id.hostname.as_deref());
                push("Location", id.location.as_deref());
            }
            Self::SwitchName => push("Name", id.hostname.as_deref()),
            Self::Syslog => {
                if c.syslog_ip.is_some() {
                    push("Syslog IP", c.syslog_ip.as_deref());
                    push("Facility", Some(c.facility.as_str()));
                    push("Severity", Some(c.severity.as_str()));
                }
            }
            Self::Radius => {
                push("Primary", c.radius_primary.as_deref());
                push("Secondary", c.radius_secondary.as_deref());
            }
            Self::RadiusSecret => push("Secret", c.radius_secret.as_ref().map(|_| MASK)),
            Self::AdminPassword => push("Password", c.admin_password.as_ref().map(|_| MASK)),
            Self::Switches => {
                let count = t.switch_count.map(|n| n.to_string());
                push("Qty", count.as_deref());
                push("Ports", t.ports.as_deref());
            }
            Self::Uplink => {
                if let Some(uplink) = &t.uplink {
                    let shown = format!("{} ({})", uplink.ports, uplink.medium);
                    push("Ports", Some(shown.as_str()));
                }
            }
            Self::Vlans => {
                for (name, tag) in state.vlans.iter() {
                    push("", Some(format!("{name}\t{tag}").as_str()));
                }
            }
            Self::Build | Self::Help | Self::Exit => {}
        }
        values
    }
}

/// Render the menu for the current state.
pub fn render(state: &SessionState) -> String {
    let items = MenuItem::for_profile(state.profile);
    let mut out = String::new();
    let _ = writeln!(out, "\n{} MENU {}", "-".repeat(20), "-".repeat(20));
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:<3} {}", format!("{}.", i + 1), item.title());
        for (label, value) in item.values(state) {
            if label.is_empty() {
                let _ = writeln!(out, "\t{}", value.green());
            } else {
                let _ = writeln!(out, "\t{label}: {}", value.green());
            }
        }
    }
    let _ = write!(out, "{}", "-".repeat(46));
    out
}
