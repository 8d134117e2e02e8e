//! Applying a command plan.

use std::fmt;

use log::{debug, error, info, warn};

use super::CommandInterface;
use crate::error::Error;
use crate::plan::{Command, CommandPlan, GuardedStep};

/// What happened to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Not sent, because its guard did not allow it or an earlier command
    /// in the same step failed.
    Skipped,
    Failed(String),
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// `(command, outcome)` pairs in the order they were considered.
///
/// Commands are stored in their loggable form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub entries: Vec<(String, CommandOutcome)>,
    /// The session dropped or fell out of step partway through, so the
    /// remaining commands were never sent.
    pub session_lost: bool,
}

impl ApplyReport {
    fn record(&mut self, command: &Command, outcome: CommandOutcome) {
        self.entries.push((command.loggable().to_string(), outcome));
    }

    fn skip_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            self.record(command, CommandOutcome::Skipped);
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(command, outcome)| match outcome {
            CommandOutcome::Failed(reason) => Some((command.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, CommandOutcome::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CommandOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CommandOutcome::Failed(_)))
    }

    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && !self.session_lost
    }

    fn count(&self, pred: impl Fn(&CommandOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Run `plan` against `interface`.
///
/// Command failures are recorded and logged; they never stop the plan.
/// Inside a guarded step the first failure skips the rest of that step.
/// `save` is attempted last unless the session was lost, in which case
/// everything after the failing command is recorded as skipped.
pub async fn apply_plan<I: CommandInterface>(interface: &mut I, plan: &CommandPlan) -> ApplyReport {
    let mut applier = Applier {
        interface,
        report: ApplyReport::default(),
    };

    for step in &plan.prelude {
        applier.step(step).await;
    }

    for command in plan.commands() {
        applier.run(command).await;
    }

    let report = applier.report;
    if report.session_lost {
        error!("session lost, configuration was not saved");
    }
    info!(
        "plan finished: {} applied, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed()
    );
    report
}

struct Applier<'a, I> {
    interface: &'a mut I,
    report: ApplyReport,
}

impl<I: CommandInterface> Applier<'_, I> {
    async fn step(&mut self, step: &GuardedStep) {
        if self.report.session_lost {
            self.report.skip_all(std::iter::once(&step.query).chain(&step.commands));
            return;
        }

        let output = match self.interface.execute(&step.query).await {
            Ok(response) => {
                self.report.record(&step.query, CommandOutcome::Applied);
                response.result
            }
            Err(e) => {
                warn!("{}: query '{}' failed: {e}", step.label, step.query.loggable());
                self.fail(&step.query, &e);
                self.report.skip_all(&step.commands);
                return;
            }
        };

        if !step.guard.should_run(&output) {
            debug!("{}: nothing to do", step.label);
            self.report.skip_all(&step.commands);
            return;
        }

        let mut failed = false;
        for command in &step.commands {
            if failed {
                self.report.record(command, CommandOutcome::Skipped);
                continue;
            }
            if !self.run(command).await {
                warn!("{}: stopping step after failure", step.label);
                failed = true;
            }
        }
    }

    /// Send one command and record its outcome. Returns false if it was
    /// not applied.
    async fn run(&mut self, command: &Command) -> bool {
        if self.report.session_lost {
            self.report.record(command, CommandOutcome::Skipped);
            return false;
        }
        match self.interface.execute(command).await {
            Ok(_) => {
                self.report.record(command, CommandOutcome::Applied);
                true
            }
            Err(e) => {
                warn!("command '{}' failed: {e}", command.loggable());
                self.fail(command, &e);
                false
            }
        }
    }

    fn fail(&mut self, command: &Command, e: &Error) {
        if e.is_session_lost() {
            error!("session lost at '{}', skipping remaining commands", command.loggable());
            self.report.session_lost = true;
        }
        self.report.record(command, CommandOutcome::Failed(e.to_string()));
    }
}
