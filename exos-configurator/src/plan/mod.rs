//! Command plan construction.
//!
//! A [`CommandPlan`] is the complete, ordered list of CLI commands for one
//! build. It is rendered from the profile templates once the session passes
//! the readiness gate and never changes afterwards.
//!
//! ```text
//! prelude (guarded steps) ─► body ─► uplink suffix (copper only) ─► save
//! ```

mod profile;
pub mod template;

pub use profile::{Profile, build_plan};
pub use template::Vars;

use std::fmt;
use std::time::Duration;

use crate::error::TemplateError;

/// Text shown in place of secret values.
pub const MASK: &str = "****";

/// A single CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The exact line sent to the switch.
    pub line: String,

    /// Extra text sent after the line, for commands that read multi-line
    /// input (e.g. `configure banner`).
    pub input: Option<String>,

    /// Read timeout for this command, overriding the session default.
    pub timeout: Option<Duration>,

    /// The line with secret values masked, when it contains any.
    masked: Option<String>,
}

impl Command {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            input: None,
            timeout: None,
            masked: None,
        }
    }

    /// Attach inline input.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Allow this command longer (or shorter) than the session timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render a template, keeping a masked copy if it references secrets.
    pub fn render(template: &str, vars: &Vars) -> Result<Self, TemplateError> {
        let line = template::render(template, vars)?;
        let masked = if template::placeholders(template).any(|name| vars.is_secret(name)) {
            Some(template::render(template, &vars.masked())?)
        } else {
            None
        };
        Ok(Self {
            line,
            input: None,
            timeout: None,
            masked,
        })
    }

    /// The line as it may be logged or shown to the operator.
    pub fn loggable(&self) -> &str {
        self.masked.as_deref().unwrap_or(&self.line)
    }

    pub fn is_sensitive(&self) -> bool {
        self.masked.is_some()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.loggable())
    }
}

/// When a guarded step's commands should run, judged on the query output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Run unless some output line begins with this word.
    Absent(String),
    /// Run only if the output contains this text.
    Present(String),
}

impl Guard {
    pub fn should_run(&self, output: &str) -> bool {
        match self {
            Self::Absent(word) => !output
                .lines()
                .any(|line| line.split_whitespace().next() == Some(word.as_str())),
            Self::Present(text) => output.contains(text.as_str()),
        }
    }
}

/// A prelude step: query first, then run `commands` if the guard allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedStep {
    /// Short description for reports, e.g. `VLAN Staff`.
    pub label: String,
    pub query: Command,
    pub guard: Guard,
    pub commands: Vec<Command>,
}

/// The ordered command plan for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub prelude: Vec<GuardedStep>,
    pub body: Vec<Command>,
    /// Only populated for copper uplinks.
    pub uplink_suffix: Vec<Command>,
    pub save: Command,
}

impl CommandPlan {
    /// Unguarded commands in execution order, ending with `save`.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.body
            .iter()
            .chain(self.uplink_suffix.iter())
            .chain(std::iter::once(&self.save))
    }

    /// Number of commands that may be sent, guard queries included.
    pub fn len(&self) -> usize {
        self.prelude
            .iter()
            .map(|step| 1 + step.commands.len())
            .sum::<usize>()
            + self.body.len()
            + self.uplink_suffix.len()
            + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_commands_are_masked() {
        let mut vars = Vars::new();
        vars.set("name", "snmpuser").set_secret("auth", "hunter22");
        let command = Command::render("configure snmpv3 add user {name} authentication md5 {auth}", &vars)
            .unwrap();
        assert_eq!(
            command.line,
            "configure snmpv3 add user snmpuser authentication md5 hunter22"
        );
        assert_eq!(
            command.loggable(),
            "configure snmpv3 add user snmpuser authentication md5 ****"
        );
        assert!(command.is_sensitive());
        assert_eq!(command.to_string(), command.loggable());
    }

    #[test]
    fn test_plain_commands_are_not_masked() {
        let vars = Vars::new().with("ports", "1-24");
        let command = Command::render("enable lldp ports {ports}", &vars).unwrap();
        assert!(!command.is_sensitive());
        assert_eq!(command.loggable(), "enable lldp ports 1-24");
    }

    #[test]
    fn test_absent_guard_matches_vlan_name_only() {
        let guard = Guard::Absent("AV".to_string());
        assert!(guard.should_run(""));
        assert!(guard.should_run("AVMedia        30  ------------------------"));
        assert!(!guard.should_run("AV             15  ------------------------"));
        assert!(!guard.should_run("Staff          10\nAV             15"));
    }

    #[test]
    fn test_present_guard() {
        let guard = Guard::Present("user".to_string());
        assert!(guard.should_run("admin  ...\nuser   ..."));
        assert!(!guard.should_run("admin  ..."));
    }
}
