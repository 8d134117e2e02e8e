//! Command execution against a switch.
//!
//! [`CommandInterface`] is the seam between the plan and the switch: the
//! SSH-backed [`ExosDriver`] talks to a real device, [`DryRun`] only records
//! what would be sent. [`apply_plan`] walks a [`CommandPlan`] over either.
//!
//! [`CommandPlan`]: crate::plan::CommandPlan

mod apply;
mod builder;
mod dry_run;
mod exos;
mod response;

pub use apply::{ApplyReport, CommandOutcome, apply_plan};
pub use builder::DriverBuilder;
pub use dry_run::DryRun;
pub use exos::ExosDriver;
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::plan::Command;

/// Something that can run CLI commands on a switch.
pub trait CommandInterface: Send {
    /// Run one command and wait for it to complete.
    ///
    /// A command the switch rejects is reported as
    /// [`Error::CommandRejected`](crate::Error::CommandRejected).
    fn execute(&mut self, command: &Command) -> impl Future<Output = Result<Response>> + Send;
}
