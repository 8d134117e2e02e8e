//! Post-build firmware check.

use std::time::Duration;

use log::{debug, info};

use crate::config::FirmwareTarget;
use crate::driver::CommandInterface;
use crate::error::{ChannelError, Error, Result};
use crate::plan::Command;
use crate::session::Prompter;

const SHOW_IMAGE: &str = "show version | include Image";

/// What the firmware check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareStatus {
    /// The running image already is the target version.
    Current,
    /// The image was downloaded and the switch is rebooting.
    Upgraded,
    /// An upgrade was offered and declined.
    Declined,
}

/// Compare the running image with `target` and offer to upgrade.
///
/// The reboot drops the session, so a closed channel or a missing prompt
/// after `reboot` counts as success.
pub async fn check_firmware<I, P>(
    interface: &mut I,
    prompter: &mut P,
    target: &FirmwareTarget,
) -> Result<FirmwareStatus>
where
    I: CommandInterface,
    P: Prompter,
{
    let response = interface.execute(&Command::new(SHOW_IMAGE)).await?;
    if response.contains(&target.version) {
        info!("firmware {} already running", target.version);
        return Ok(FirmwareStatus::Current);
    }

    prompter.show(&format!(
        "\nRunning image:\n{}\nTarget version: {}",
        response.result.trim(),
        target.version
    ))?;
    let answer = prompter
        .read_line("Would you like to upgrade firmware now? (y/N): ")?
        .unwrap_or_default();
    if !answer.trim().eq_ignore_ascii_case("y") {
        return Ok(FirmwareStatus::Declined);
    }

    // Download and install run for minutes without output.
    let download = Command::new(format!("download url {}", target.url))
        .with_timeout(Duration::from_secs(target.download_timeout_secs));
    interface.execute(&download).await?;

    match interface.execute(&Command::new("reboot")).await {
        Ok(_) => {}
        Err(Error::Channel(
            ChannelError::Closed | ChannelError::PatternTimeout(_) | ChannelError::Desynchronized,
        )) => {
            debug!("session ended by reboot");
        }
        Err(e) => return Err(e),
    }
    info!("firmware {} installed, switch rebooting", target.version);
    Ok(FirmwareStatus::Upgraded)
}
