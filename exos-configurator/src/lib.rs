//! # exos-configurator
//!
//! Interactive configuration builder for ExtremeXOS switches and stacks.
//!
//! An operator answers a numbered menu (management IP, SNMP, syslog, RADIUS,
//! admin password, stack size, uplink, VLANs). Once every required answer is
//! present the tool renders a fixed command plan and applies it to the switch
//! over SSH, reporting every command that failed without stopping.
//!
//! ## Layout
//!
//! - [`session`]: menu loop and session state
//! - [`topology`]: port range and uplink derivation
//! - [`plan`]: command templates and the rendered [`CommandPlan`](plan::CommandPlan)
//! - [`driver`]: [`CommandInterface`](driver::CommandInterface) backends and [`apply_plan`](driver::apply_plan)
//! - [`transport`], [`channel`], [`platform`]: the SSH session to the EXOS CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use exos_configurator::driver::{DryRun, apply_plan};
//! use exos_configurator::session::{Collector, Outcome, TerminalPrompter};
//! use exos_configurator::{Profile, SiteConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), exos_configurator::Error> {
//!     let site = SiteConfig::load(None)?;
//!     let mut collector = Collector::new(Profile::Compact, &site, TerminalPrompter::new());
//!
//!     if let Outcome::Build(plan) = collector.run()? {
//!         let report = apply_plan(&mut DryRun::new().echo(true), &plan).await;
//!         println!("{} commands, {} failed", report.entries.len(), report.failed());
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod firmware;
pub mod password;
pub mod plan;
pub mod platform;
pub mod session;
pub mod topology;
pub mod transport;

// Re-export main types for convenience
pub use config::SiteConfig;
pub use driver::{ApplyReport, CommandInterface, DriverBuilder, DryRun, ExosDriver, Response, apply_plan};
pub use error::{Error, Result};
pub use plan::{CommandPlan, Profile};
pub use platform::PlatformDefinition;
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
