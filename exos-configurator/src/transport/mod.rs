//! SSH transport to the switch.
//!
//! Connection setup, authentication, host-key checking and opening the
//! interactive shell channel the driver talks through.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
