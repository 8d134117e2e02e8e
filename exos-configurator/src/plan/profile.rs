//! Build profiles and their command templates.
//!
//! - `full`: single switch or stack with 12/24/48 edge ports, SNMPv3,
//!   syslog, RADIUS management access, MSTP, MAC-locking, MAC netlogin and
//!   an uplink-specific block for copper uplinks.
//! - `compact`: stack of 48-port members with 4x10G LACP uplinks on ports
//!   57-60, QoS for voice/video and NTP.

use std::fmt;

use clap::ValueEnum;

use super::template::Vars;
use super::{Command, CommandPlan, Guard, GuardedStep};
use crate::config::SiteConfig;
use crate::error::TemplateError;
use crate::session::BuildInputs;
use crate::topology::RangeStyle;

/// Which menu and command set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    #[default]
    Full,
    Compact,
}

impl Profile {
    /// How a standalone switch's edge ports are written.
    pub fn range_style(self) -> RangeStyle {
        match self {
            Self::Full => RangeStyle::Standalone,
            Self::Compact => RangeStyle::Slotted,
        }
    }

    fn body(self) -> &'static [&'static str] {
        match self {
            Self::Full => FULL_BODY,
            Self::Compact => COMPACT_BODY,
        }
    }

    /// Ports every new VLAN is tagged on.
    fn vlan_trunk(self) -> &'static str {
        match self {
            Self::Full => "{uplink}",
            Self::Compact => "1:57-60",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Compact => f.write_str("compact"),
        }
    }
}

const FULL_BODY: &[&str] = &[
    "configure Default delete ports all",
    "configure vlan NetMgmt ipaddress {switch_ip} 255.255.255.0",
    "configure iproute add default {gateway_ip}",
    "configure snmp sysContact \"{contact}\"",
    "configure snmp sysName {hostname}",
    "configure snmp sysLocation {location}",
    "configure snmpv3 add user snmpuser authentication md5 {snmp_auth} privacy des {snmp_priv}",
    "configure snmpv3 add group public user snmpuser sec-model usm",
    "configure snmpv3 add access public sec-model usm sec-level priv read-view \"defaultAdminView\" write-view \"defaultAdminView\" notify-view \"defaultAdminView\"",
    "enable snmp access snmpv3",
    "enable ssh2",
    "disable telnet",
    "disable web http",
    "enable igmp snooping",
    "configure ports {ports} rate-limit flood broadcast 500",
    "create stpd s1",
    "disable s0 auto-bind Default",
    "configure mstp revision 3",
    "configure stpd s1 mode mstp msti 1",
    "enable s1 auto-bind vlan 1-4094",
    "enable stpd s1",
    "enable mac-locking",
    "enable mac-locking ports {ports}",
    "configure mac-locking ports {ports} first-arrival limit-learning 8",
    "configure stpd s0 ports link-type edge {ports} edge-safeguard enable bpdu-restrict",
    "configure stpd s1 ports link-type edge {ports} edge-safeguard enable bpdu-restrict",
    "create vlan nt_login",
    "enable policy",
    "enable netlogin mac",
    "configure netlogin mac authentication database-order radius",
    "configure netlogin add mac-list ff:ff:ff:ff:ff:ff 48",
    "configure netlogin mac timers reauth-period 3600",
    "enable netlogin ports {ports} mac",
    "enable lldp port all",
    "configure vlan VoIP add ports {ports} tagged",
    "configure lldp ports {ports} advertise port-description",
    "configure lldp ports {ports} advertise system-capabilities",
    "configure lldp ports {ports} advertise management-address",
    "configure lldp ports {ports} advertise vendor-specific dot3 power-via-mdi",
    "configure lldp ports {ports} advertise vendor-specific med capabilities",
    "configure sntp-client primary {sntp_primary}",
    "configure sntp-client secondary {sntp_secondary}",
    "enable sntp-client",
    "configure timezone {timezone}",
    "configure syslog {syslog_ip} vr VR-Default {facility}",
    "configure syslog {syslog_ip} vr VR-Default {facility} severity {severity}",
    "enable log target syslog {syslog_ip} vr VR-Default {facility}",
    "configure radius mgmt-access 3 server {radius_primary} 1812 client-ip {switch_ip} vr VR-Default",
    "configure radius mgmt-access 4 server {radius_secondary} 1812 client-ip {switch_ip} vr VR-Default",
    "configure radius 3 shared-secret {radius_secret}",
    "configure radius 4 shared-secret {radius_secret}",
    "enable radius mgmt-access",
    "configure account admin encrypted {admin_password}",
];

/// Undo edge-port protections on a copper uplink.
const FULL_UPLINK_SUFFIX: &[&str] = &[
    "configure ports {uplink} rate-limit flood broadcast no-limit",
    "disable mac-locking ports {uplink}",
    "configure mac-locking ports {uplink} first-arrival limit-learning 600",
    "configure stpd s0 ports link-type auto {uplink}",
    "configure stpd s0 ports edge-safeguard disable {uplink}",
    "configure stpd s0 ports bpdu-restrict disable {uplink}",
    "configure stpd s1 ports link-type auto {uplink}",
    "configure stpd s1 ports edge-safeguard disable {uplink}",
    "configure stpd s1 ports bpdu-restrict disable {uplink}",
    "disable netlogin ports {uplink} mac",
    "unconfigure lldp ports {uplink}",
];

const COMPACT_BODY: &[&str] = &[
    "configure ports 1:57,{last_slot}:57 partition 4x10G",
    "configure ports 1:57-60,{last_slot}:57-60 auto off speed 10000 duplex full",
    "enable sharing 1:57 grouping 1:57,{last_slot}:57 lacp",
    "enable sharing 1:58 grouping 1:58,{last_slot}:58 lacp",
    "enable sharing 1:59 grouping 1:59,{last_slot}:59 lacp",
    "enable sharing 1:60 grouping 1:60,{last_slot}:60 lacp",
    "configure vlan Default delete ports all",
    "create qosprofile \"QP6\"",
    "configure qosprofile QP6 maxbuffer 100 use-strict-priority",
    "configure qosprofile QP6 minbw 0 maxbw 100 ports {ports}",
    "configure diffserv examination code-point 24 qosprofile QP6",
    "configure diffserv examination code-point 46 qosprofile QP6",
    "enable diffserv examination ports {ports}",
    "disable dot1p examination ports all",
    "configure vlan untagged-ports auto-move inform",
    "configure cli moved-keywords show",
    "configure cli idle-timeout 240",
    "configure log target memory-buffer format timestamp hundredths date mm/dd/yyyy event-name condition severity",
    "configure log target nvram format timestamp hundredths date mm/dd/yyyy event-name condition severity",
    "configure log target console format timestamp hundredths date mm/dd/yyyy event-name condition severity",
    "configure vlan Staff add ports {ports} untagged",
    "configure vlan NetMgmt ipaddress {switch_ip}/23",
    "configure iproute add default {gateway_ip}",
    "configure snmp sysContact \"{contact}\"",
    "configure snmp sysName {hostname}",
    "configure snmp sysLocation {hostname}",
    "disable snmpv3 default-group",
    "enable snmp access snmpv3",
    "enable ssh2",
    "enable igmp snooping",
    "enable lldp ports all",
    "configure lldp ports all advertise all-tlvs",
    "configure lldp ports all advertise vendor-specific med capabilities",
    "configure lldp management-address vlan NetMgmt",
    "configure ntp server add {ntp_server} vr VR-Default",
    "enable ntp vlan NetMgmt",
    "configure vlan ElrpVlan add ports all tagged",
    "configure timezone {timezone}",
    "enable tech-support collector",
    "enable loopback-mode vlan NetMgmt",
    "configure stacking slot 2 master-capability off",
    "configure stacking slot {last_slot} master-capability on",
];

const VLAN_QUERY: &str = "show vlan | include \"^{name} \"";
const VLAN_CREATE: &str = "create vlan {name} tag {tag}";
const BANNER: &str = "configure banner before-login save-to-configuration";

/// Render the full command plan for a ready session.
pub fn build_plan(inputs: &BuildInputs<'_>, site: &SiteConfig) -> Result<CommandPlan, TemplateError> {
    let profile = inputs.profile;
    let vars = variables(inputs, site);

    let mut prelude = Vec::new();

    if profile == Profile::Full {
        prelude.push(GuardedStep {
            label: "remove default user account".to_string(),
            query: Command::new("show accounts"),
            guard: Guard::Present("user".to_string()),
            commands: vec![Command::new("delete account user")],
        });
    }

    let trunk = format!("configure vlan {{name}} add ports {} tagged", profile.vlan_trunk());
    for (name, tag) in inputs.vlans.iter() {
        let mut vlan_vars = vars.clone();
        vlan_vars.set("name", name).set("tag", tag.to_string());
        prelude.push(GuardedStep {
            label: format!("VLAN {name}"),
            query: Command::render(VLAN_QUERY, &vlan_vars)?,
            guard: Guard::Absent(name.to_string()),
            commands: vec![
                Command::render(VLAN_CREATE, &vlan_vars)?,
                Command::render(&trunk, &vlan_vars)?,
            ],
        });
    }

    let mut body = profile
        .body()
        .iter()
        .map(|template| Command::render(template, &vars))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(banner) = site.banner.as_deref().filter(|b| !b.trim().is_empty()) {
        body.push(Command::new(BANNER).with_input(banner));
    }

    let uplink_suffix = match &inputs.management {
        Some(management) if management.uplink.medium.is_copper() => FULL_UPLINK_SUFFIX
            .iter()
            .map(|template| Command::render(template, &vars))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(CommandPlan {
        prelude,
        body,
        uplink_suffix,
        save: Command::new("save"),
    })
}

fn variables(inputs: &BuildInputs<'_>, site: &SiteConfig) -> Vars {
    let mut vars = Vars::new();
    vars.set("switch_ip", inputs.switch_ip)
        .set("gateway_ip", inputs.gateway_ip)
        .set("last_slot", inputs.switch_count.to_string())
        .set("ports", inputs.ports)
        .set("contact", site.contact.as_str())
        .set("timezone", site.time.timezone.as_str())
        .set("sntp_primary", site.time.sntp_primary.as_str())
        .set("sntp_secondary", site.time.sntp_secondary.as_str())
        .set("ntp_server", site.time.ntp_server.as_str());

    match &inputs.management {
        Some(m) => {
            vars.set("hostname", inputs.hostname.to_lowercase())
                .set("location", m.location.to_lowercase())
                .set_secret("snmp_auth", m.snmp_auth)
                .set_secret("snmp_priv", m.snmp_priv)
                .set("syslog_ip", m.syslog_ip)
                .set("facility", m.facility)
                .set("severity", m.severity.as_str())
                .set("radius_primary", m.radius_primary)
                .set("radius_secondary", m.radius_secondary)
                .set_secret("radius_secret", m.radius_secret)
                .set_secret("admin_password", m.admin_password)
                .set("uplink", m.uplink.ports.as_str());
        }
        None => {
            vars.set("hostname", inputs.hostname);
        }
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::session::{Management, Severity, VlanSet};
    use crate::topology::{Medium, Uplink};

    fn vlans() -> VlanSet {
        let mut vlans = VlanSet::new();
        vlans.insert("Staff", 10);
        vlans.insert("VoIP", 99);
        vlans
    }

    fn full_inputs<'a>(vlans: &'a VlanSet, uplink: &'a Uplink) -> BuildInputs<'a> {
        BuildInputs {
            profile: Profile::Full,
            switch_ip: "10.1.2.3",
            gateway_ip: "10.1.2.254",
            hostname: "HMD-IDF2",
            switch_count: 1,
            ports: "1-24",
            vlans,
            management: Some(Management {
                location: "Building A",
                snmp_auth: "authkey1",
                snmp_priv: "privkey1",
                syslog_ip: "10.0.0.3",
                facility: "local4",
                severity: Severity::Info,
                radius_primary: "10.0.0.1",
                radius_secondary: "10.0.0.2",
                radius_secret: "radsecret",
                admin_password: "$5$abcdef$hash",
                uplink,
            }),
        }
    }

    #[test]
    fn test_full_plan_ordering() {
        let vlans = vlans();
        let uplink = Uplink {
            ports: "10".into(),
            medium: Medium::Copper,
        };
        let plan = build_plan(&full_inputs(&vlans, &uplink), &SiteConfig::default()).unwrap();

        assert_eq!(plan.prelude.len(), 3);
        assert_eq!(plan.prelude[0].query.line, "show accounts");
        assert_eq!(plan.prelude[1].label, "VLAN Staff");
        assert_eq!(plan.prelude[1].query.line, "show vlan | include \"^Staff \"");
        assert_eq!(
            plan.prelude[1]
                .commands
                .iter()
                .map(|c| c.line.as_str())
                .collect::<Vec<_>>(),
            vec!["create vlan Staff tag 10", "configure vlan Staff add ports 10 tagged"]
        );

        assert_eq!(plan.body.len(), FULL_BODY.len());
        assert_eq!(plan.body[0].line, "configure Default delete ports all");
        assert_eq!(
            plan.body[1].line,
            "configure vlan NetMgmt ipaddress 10.1.2.3 255.255.255.0"
        );
        assert_eq!(plan.body[4].line, "configure snmp sysName hmd-idf2");
        assert_eq!(plan.body[5].line, "configure snmp sysLocation building a");

        assert_eq!(plan.uplink_suffix.len(), FULL_UPLINK_SUFFIX.len());
        assert_eq!(plan.uplink_suffix[1].line, "disable mac-locking ports 10");

        let last = plan.commands().last().unwrap();
        assert_eq!(last.line, "save");
    }

    #[test]
    fn test_fiber_uplink_has_no_suffix() {
        let vlans = vlans();
        let uplink = Uplink {
            ports: "1:52,2:52".into(),
            medium: Medium::Fiber,
        };
        let plan = build_plan(&full_inputs(&vlans, &uplink), &SiteConfig::default()).unwrap();
        assert!(plan.uplink_suffix.is_empty());
        assert_eq!(
            plan.prelude[2].commands[1].line,
            "configure vlan VoIP add ports 1:52,2:52 tagged"
        );
    }

    #[test]
    fn test_secrets_are_masked_in_loggable_form() {
        let vlans = VlanSet::new();
        let uplink = Uplink {
            ports: "52".into(),
            medium: Medium::Fiber,
        };
        let plan = build_plan(&full_inputs(&vlans, &uplink), &SiteConfig::default()).unwrap();

        let snmp = plan
            .body
            .iter()
            .find(|c| c.line.starts_with("configure snmpv3 add user"))
            .unwrap();
        assert!(snmp.line.contains("authkey1"));
        assert_eq!(
            snmp.loggable(),
            "configure snmpv3 add user snmpuser authentication md5 **** privacy des ****"
        );

        for command in plan.commands() {
            let shown = command.loggable();
            assert!(!shown.contains("radsecret"), "{shown}");
            assert!(!shown.contains("$5$abcdef$hash"), "{shown}");
        }
    }

    #[test]
    fn test_site_values_flow_into_body() {
        let vlans = VlanSet::new();
        let uplink = Uplink {
            ports: "52".into(),
            medium: Medium::Fiber,
        };
        let mut site = SiteConfig::default();
        site.contact = "noc@example.org".into();
        site.time.sntp_primary = "192.0.2.1".into();

        let plan = build_plan(&full_inputs(&vlans, &uplink), &site).unwrap();
        let lines: Vec<&str> = plan.body.iter().map(|c| c.line.as_str()).collect();
        assert!(lines.contains(&"configure snmp sysContact \"noc@example.org\""));
        assert!(lines.contains(&"configure sntp-client primary 192.0.2.1"));
        assert!(lines.contains(&"configure syslog 10.0.0.3 vr VR-Default local4 severity info"));
        assert!(lines.contains(
            &"configure radius mgmt-access 3 server 10.0.0.1 1812 client-ip 10.1.2.3 vr VR-Default"
        ));
    }

    #[test]
    fn test_compact_plan() {
        let vlans = vlans();
        let inputs = BuildInputs {
            profile: Profile::Compact,
            switch_ip: "10.5.6.7",
            gateway_ip: "10.5.6.254",
            hostname: "Core-Stack",
            switch_count: 2,
            ports: "1:1-48,2:1-48",
            vlans: &vlans,
            management: None,
        };
        let plan = build_plan(&inputs, &SiteConfig::default()).unwrap();

        // No account clean-up in this profile.
        assert_eq!(plan.prelude.len(), 2);
        assert_eq!(
            plan.prelude[0].commands[1].line,
            "configure vlan Staff add ports 1:57-60 tagged"
        );
        assert_eq!(plan.body[0].line, "configure ports 1:57,2:57 partition 4x10G");
        assert!(plan.body.iter().any(|c| c.line == "configure vlan NetMgmt ipaddress 10.5.6.7/23"));
        assert!(plan.body.iter().any(|c| c.line == "configure snmp sysLocation Core-Stack"));
        assert_eq!(
            plan.body.last().unwrap().line,
            "configure stacking slot 2 master-capability on"
        );
        assert!(plan.uplink_suffix.is_empty());
        assert_eq!(plan.save.line, "save");
    }

    #[test]
    fn test_banner_carries_inline_input() {
        let vlans = VlanSet::new();
        let inputs = BuildInputs {
            profile: Profile::Compact,
            switch_ip: "10.5.6.7",
            gateway_ip: "10.5.6.254",
            hostname: "core",
            switch_count: 1,
            ports: "1:1-48",
            vlans: &vlans,
            management: None,
        };
        let mut site = SiteConfig::default();
        site.banner = Some("Unauthorized access is prohibited".into());

        let plan = build_plan(&inputs, &site).unwrap();
        let banner = plan.body.last().unwrap();
        assert_eq!(banner.line, BANNER);
        assert_eq!(banner.input.as_deref(), Some("Unauthorized access is prohibited"));
    }

    #[test]
    fn test_every_template_renders() {
        let vlans = vlans();
        let uplink = Uplink {
            ports: "10".into(),
            medium: Medium::Copper,
        };
        // A missing variable in any template would fail here.
        assert!(build_plan(&full_inputs(&vlans, &uplink), &SiteConfig::default()).is_ok());
    }
}
