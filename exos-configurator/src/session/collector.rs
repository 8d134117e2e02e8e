//! The menu loop.

use std::io;

use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use super::menu::{self, MenuItem};
use super::prompt::Prompter;
use super::{SessionState, Severity, StackAck, VlanSet};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::password::hash_password;
use crate::plan::{CommandPlan, Profile, build_plan};
use crate::topology::{EdgePorts, MAX_STACK_SIZE, classify_uplink, port_range};

/// How the menu loop ended.
#[derive(Debug)]
pub enum Outcome {
    /// The readiness gate passed and the plan was rendered.
    Build(CommandPlan),
    /// Exit chosen, or input ended.
    Exit,
}

/// Result of the stack pre-flight questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preflight {
    Ready(StackAck),
    /// Operator asked to run `enable stacking` now; the switch reboots.
    EnableStacking,
    Stop,
}

const HELP: &str = "\
To report an issue, open a ticket with the network team and include:
  - the profile and answers used (secrets omitted)
  - the failed commands printed after the build

For a detailed log, run again with RUST_LOG=debug (or -vv) and attach the output.";

/// Interactive collector owning the session state.
pub struct Collector<'a, P> {
    prompter: P,
    site: &'a SiteConfig,
    state: SessionState,
}

impl<'a, P: Prompter> Collector<'a, P> {
    pub fn new(profile: Profile, site: &'a SiteConfig, prompter: P) -> Self {
        let mut state = SessionState::new(
            profile,
            site.syslog.facility.clone(),
            Severity::from_level(site.syslog.severity),
        );
        if profile == Profile::Compact {
            state.vlans = VlanSet::from(site.vlans.as_slice());
        }
        Self {
            prompter,
            site,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Ask whether a stack is being configured and whether stacking is on.
    ///
    /// Only meaningful for the full profile.
    pub fn preflight(&mut self) -> Result<Preflight> {
        let outcome = match self.preflight_inner() {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Preflight::Stop,
            other => other?,
        };
        if let Preflight::Ready(ack) = outcome {
            debug!("stack acknowledgment: {ack:?}");
            self.state.topology.acknowledged = Some(ack);
        }
        Ok(outcome)
    }

    fn preflight_inner(&mut self) -> io::Result<Preflight> {
        let answer =
            self.ask("\nAre you configuring a stack consisting of more than one switch? (y/N): ")?;
        match answer.trim().to_lowercase().as_str() {
            "y" => {
                let done =
                    self.ask("Did you already run \"enable stacking\" on the primary member? (y/N): ")?;
                if done.trim().eq_ignore_ascii_case("y") {
                    return Ok(Preflight::Ready(StackAck::Stack));
                }
                let now = self.ask(
                    "Would you like to run \"enable stacking\" now? This will reboot the switch! (y/N): ",
                )?;
                if now.trim().eq_ignore_ascii_case("y") {
                    Ok(Preflight::EnableStacking)
                } else {
                    self.prompter
                        .show("Please enable stacking first before running this tool")?;
                    Ok(Preflight::Stop)
                }
            }
            "n" | "" => Ok(Preflight::Ready(StackAck::Standalone)),
            _ => {
                self.prompter.show("Exiting...")?;
                Ok(Preflight::Stop)
            }
        }
    }

    /// Run the menu until the operator builds or exits.
    pub fn run(&mut self) -> Result<Outcome> {
        loop {
            match self.step() {
                Ok(Next::Menu) => {}
                Ok(Next::Exit) => return Ok(Outcome::Exit),
                Ok(Next::Build) => {
                    if let Some(plan) = self.try_build()? {
                        return Ok(Outcome::Build(plan));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!("input closed, leaving menu");
                    return Ok(Outcome::Exit);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Show the menu and run one handler.
    fn step(&mut self) -> io::Result<Next> {
        let items = MenuItem::for_profile(self.state.profile);
        self.prompter.show(&menu::render(&self.state))?;
        let choice = self.ask(&format!("Enter your selection [1-{}]: ", items.len()))?;

        let Some(item) = MenuItem::select(self.state.profile, &choice) else {
            if choice.trim().parse::<usize>().is_err() {
                self.prompter.show("Please enter a number for selection")?;
            } else {
                self.prompter.show("Invalid selection, please try again...")?;
            }
            return Ok(Next::Menu);
        };

        match item {
            MenuItem::SwitchIp => self.switch_ip()?,
            MenuItem::Snmp => self.snmp()?,
            MenuItem::SwitchName => self.switch_name()?,
            MenuItem::Syslog => self.syslog()?,
            MenuItem::Radius => self.radius()?,
            MenuItem::RadiusSecret => self.radius_secret()?,
            MenuItem::AdminPassword => self.admin_password()?,
            MenuItem::Switches => self.switches()?,
            MenuItem::Uplink => self.uplink()?,
            MenuItem::Vlans => self.vlans()?,
            MenuItem::Help => self.help()?,
            MenuItem::Build => return Ok(Next::Build),
            MenuItem::Exit => return Ok(Next::Exit),
        }
        Ok(Next::Menu)
    }

    /// Readiness gate. Renders the plan when every required field is set.
    fn try_build(&mut self) -> Result<Option<CommandPlan>> {
        let plan = match self.state.readiness() {
            Ok(inputs) => build_plan(&inputs, self.site)?,
            Err(missing) => {
                let message = format!(
                    "At least one value is not set, fill these in before building: {}",
                    missing.join(", ")
                );
                warn!("build rejected, missing: {}", missing.join(", "));
                self.prompter.pause(&format!("\n{message}\n"))?;
                return Ok(None);
            }
        };
        info!("rendered plan with {} commands", plan.len());
        self.prompter
            .show("Building configuration...this may take a couple minutes...")?;
        Ok(Some(plan))
    }

    /// Read a line; end of input becomes an `UnexpectedEof` error.
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.prompter
            .read_line(prompt)?
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }

    /// Read a line, mapping blank input to `None`.
    fn ask_opt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let answer = self.ask(prompt)?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn ask_secret(&mut self, prompt: &str) -> io::Result<Option<SecretString>> {
        let secret = self
            .prompter
            .read_secret(prompt)?
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        Ok((!secret.expose_secret().is_empty()).then_some(secret))
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.prompter.pause(&format!("{message}\nPress enter to continue..."))?;
        Ok(())
    }

    fn switch_ip(&mut self) -> io::Result<()> {
        match self.ask_opt("IP: ")? {
            Some(ip) => {
                self.state.identity.set_ip(&ip);
                if self.state.identity.gateway.is_none() {
                    warn!("cannot derive a gateway from '{ip}'");
                    self.notice("Unable to derive the gateway, expected an address like 10.1.2.3")?;
                }
            }
            None => {
                self.state.identity.ip = None;
                self.state.identity.gateway = None;
            }
        }
        Ok(())
    }

    fn snmp(&mut self) -> io::Result<()> {
        self.state.credentials.snmp_auth = self.ask_secret("Auth: ")?;
        self.state.credentials.snmp_priv = self.ask_secret("Priv: ")?;
        self.state.identity.hostname = self.ask_opt("Hostname: ")?;
        self.state.identity.location = self.ask_opt("Location: ")?;

        let hostname = self.state.identity.hostname.as_deref().unwrap_or_default();
        match self.site.route_for(hostname) {
            Some(route) => {
                debug!("hostname '{hostname}' routed to site '{}'", route.pattern);
                let c = &mut self.state.credentials;
                c.syslog_ip = Some(route.syslog.clone());
                c.radius_primary = Some(route.radius_primary.clone());
                c.radius_secondary = Some(route.radius_secondary.clone());
            }
            None => {
                let patterns: Vec<&str> = self.site.sites.iter().map(|s| s.pattern.as_str()).collect();
                let message = format!(
                    "Unable to determine site addresses for '{hostname}'\nThe hostname must contain one of: {}",
                    patterns.join(", ")
                );
                warn!("no site route for hostname '{hostname}'");
                self.notice(&message)?;
            }
        }
        Ok(())
    }

    fn switch_name(&mut self) -> io::Result<()> {
        self.state.identity.hostname = self.ask_opt("Hostname: ")?;
        Ok(())
    }

    fn syslog(&mut self) -> io::Result<()> {
        self.state.credentials.syslog_ip = self.ask_opt("Syslog IP: ")?;
        let facility = self.ask_opt(&format!("Facility [{}]: ", self.state.credentials.facility))?;
        if let Some(facility) = facility {
            self.state.credentials.facility = facility;
        }
        loop {
            let level = self.ask("Severity [2-7]: ")?;
            match level.trim().parse::<u8>() {
                Ok(level) => {
                    self.state.credentials.severity = Severity::from_level(level);
                    return Ok(());
                }
                Err(_) => self.prompter.show("Please enter a number between 2 and 7")?,
            }
        }
    }

    fn radius(&mut self) -> io::Result<()> {
        self.state.credentials.radius_primary = self.ask_opt("Primary: ")?;
        self.state.credentials.radius_secondary = self.ask_opt("Secondary: ")?;
        Ok(())
    }

    fn radius_secret(&mut self) -> io::Result<()> {
        self.state.credentials.radius_secret = self.ask_secret("Secret: ")?;
        Ok(())
    }

    fn admin_password(&mut self) -> io::Result<()> {
        let hashed = self.ask_secret("Admin password: ")?.map(|p| hash_password(&p));
        self.state.credentials.admin_password = hashed;
        Ok(())
    }

    fn switches(&mut self) -> io::Result<()> {
        let answer = self.ask("Switch Quantity [1-8]: ")?;
        let count = match answer.trim().parse::<u8>() {
            Ok(n) if (1..=MAX_STACK_SIZE).contains(&n) => n,
            _ => return self.notice("\nInvalid selection..."),
        };

        let profile = self.state.profile;
        let topology = &mut self.state.topology;
        topology.switch_count = Some(count);

        let mismatch = match topology.acknowledged {
            Some(StackAck::Stack) if count == 1 => Some(
                "Switch quantity cannot be 1 if you acknowledged there is more than one switch",
            ),
            Some(StackAck::Standalone) if count > 1 => Some(
                "Switch quantity cannot be more than 1 if you acknowledged there is only one switch",
            ),
            _ => None,
        };
        if let Some(message) = mismatch {
            topology.reset_count();
            return self.notice(message);
        }

        let edge = match profile {
            Profile::Compact => EdgePorts::FortyEight,
            Profile::Full => {
                let answer = self.ask("Edge ports per switch [12, 24, or 48]: ")?;
                match answer.trim().parse::<u16>().ok().and_then(EdgePorts::from_count) {
                    Some(edge) => edge,
                    None => {
                        self.state.topology.reset_count();
                        return self.notice("\nInvalid selection...");
                    }
                }
            }
        };

        let topology = &mut self.state.topology;
        topology.edge_ports = Some(edge);
        topology.ports = Some(port_range(count, edge, profile.range_style()));

        let stale = topology
            .uplink
            .as_ref()
            .is_some_and(|uplink| classify_uplink(&uplink.ports, count).is_err());
        if stale {
            topology.uplink = None;
            return self.notice("The uplink no longer matches the switch quantity, enter it again");
        }
        Ok(())
    }

    fn uplink(&mut self) -> io::Result<()> {
        let Some(count) = self.state.topology.switch_count else {
            return self.notice("Set the switch quantity before the uplink");
        };
        let answer = self.ask("Uplink port(s): ")?;
        match classify_uplink(&answer, count) {
            Ok(uplink) => {
                debug!("uplink {} is {}", uplink.ports, uplink.medium);
                self.state.topology.uplink = Some(uplink);
                Ok(())
            }
            Err(e) => {
                self.state.topology.uplink = None;
                let hint = if count > 1 {
                    "\n\ti.e: 1:48 or 1:49,2:49"
                } else {
                    "\n\ti.e: 48"
                };
                self.notice(&format!("\n{e}{hint}"))
            }
        }
    }

    fn vlans(&mut self) -> io::Result<()> {
        let answer = self.ask("Do you want the default VLAN set? (y/N): ")?;
        match answer.trim().to_lowercase().as_str() {
            "y" => {
                self.state.vlans = VlanSet::from(self.site.vlans.as_slice());
            }
            "n" | "" => {
                let mut vlans = VlanSet::new();
                loop {
                    let entry = self.ask("VLAN name and ID (q = quit): ")?;
                    let entry = entry.trim();
                    if entry.eq_ignore_ascii_case("q") {
                        break;
                    }
                    let fields: Vec<&str> = entry.split_whitespace().collect();
                    let parsed = match fields[..] {
                        [name, tag] => tag.parse::<u16>().ok().map(|tag| (name, tag)),
                        _ => None,
                    };
                    match parsed {
                        Some((name, tag)) => vlans.insert(name, tag),
                        None => self.notice(
                            "Please enter the VLAN name and ID separated by a space, example: NIMM 172",
                        )?,
                    }
                }
                self.state.vlans = vlans;
            }
            _ => self.notice("\nInvalid selection, please try again...")?,
        }
        Ok(())
    }

    fn help(&mut self) -> io::Result<()> {
        self.prompter.show(HELP)?;
        self.notice("")
    }
}

enum Next {
    Menu,
    Build,
    Exit,
}
