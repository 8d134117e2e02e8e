//! SSH driver for ExtremeXOS switches.

use std::future::Future;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use super::CommandInterface;
use super::response::Response;
use crate::channel::{ShellChannel, ShellStream};
use crate::error::{Error, Result};
use crate::plan::Command;
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshTransport};

/// How many confirmation questions one command may ask before giving up.
const MAX_CONFIRMATIONS: usize = 4;

/// Tail search depth for prompt detection.
const SEARCH_DEPTH: usize = 1000;

/// Drives the EXOS CLI over an interactive SSH shell.
///
/// Confirmation questions (`save`, `reboot`, `download url`) are answered
/// with the platform's `confirm_answer`.
pub struct ExosDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    transport: Option<SshTransport>,
    shell: Option<ShellChannel>,
    timeout: Duration,
}

impl ExosDriver {
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition, timeout: Duration) -> Self {
        Self {
            ssh_config,
            platform,
            transport: None,
            shell: None,
            timeout,
        }
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn is_open(&self) -> bool {
        self.shell.is_some()
    }

    /// Per-read timeout for command output.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
        if let Some(shell) = self.shell.as_mut() {
            shell.set_timeout(timeout);
        }
    }

    /// Connect, wait for the first prompt and run the on-open commands.
    pub async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let mut config = self.ssh_config.clone();
        config.terminal_width = self.platform.terminal_width;
        config.terminal_height = self.platform.terminal_height;

        let transport = SshTransport::connect(config).await?;
        let channel = transport.open_channel().await?;
        let mut shell = ShellChannel::new(
            channel,
            self.platform.prompt.clone(),
            SEARCH_DEPTH,
            self.timeout,
        );

        let (banner, _) = shell.read_until(&[&self.platform.prompt]).await?;
        trace!("login output: {}", String::from_utf8_lossy(&banner));

        self.transport = Some(transport);
        self.shell = Some(shell);

        for line in self.platform.on_open_commands.clone() {
            let response = self.send_command(&Command::new(line)).await?;
            if let Some(failure) = &response.failure_message {
                warn!("on-open command '{}' failed: {failure}", response.command);
            }
        }

        debug!("session to {} ready", self.ssh_config.host);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<()> {
        if let Some(shell) = self.shell.take() {
            // The switch may already have dropped the channel (e.g. after reboot).
            if let Err(e) = shell.close().await {
                debug!("closing shell: {e}");
            }
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    /// Send a command and read its output up to the next prompt.
    ///
    /// Failure markers are reported through `failure_message` rather than
    /// as an error.
    pub async fn send_command(&mut self, command: &Command) -> Result<Response> {
        let shell = self.shell.as_mut().ok_or(Error::NotConnected)?;
        exchange(shell, &self.platform, command).await
    }
}

impl CommandInterface for ExosDriver {
    fn execute(&mut self, command: &Command) -> impl Future<Output = Result<Response>> + Send {
        async move { rejected_as_error(self.send_command(command).await?) }
    }
}

/// One command round trip on an open shell.
async fn exchange<S: ShellStream>(
    shell: &mut ShellChannel<S>,
    platform: &PlatformDefinition,
    command: &Command,
) -> Result<Response> {
    let start = Instant::now();
    let limit = command.timeout.unwrap_or(shell.timeout());

    debug!("> {}", command.loggable());
    shell.send(&command.line).await?;
    if let Some(input) = &command.input {
        for line in input.lines() {
            shell.send(line).await?;
        }
        // An empty line ends multi-line input.
        shell.send("").await?;
    }

    let mut data = Vec::new();
    let mut confirmations = 0;
    loop {
        let (chunk, matched) = shell
            .read_until_within(&[&platform.prompt, &platform.confirm], limit)
            .await?;
        data.extend_from_slice(&chunk);
        if matched == 0 || confirmations == MAX_CONFIRMATIONS {
            break;
        }
        confirmations += 1;
        debug!("answering confirmation for '{}'", command.loggable());
        shell.send(&platform.confirm_answer).await?;
    }

    let elapsed = start.elapsed();
    let mut raw_result = String::from_utf8_lossy(&data).into_owned();
    if command.is_sensitive() {
        raw_result = raw_result.replace(&command.line, command.loggable());
    }

    let prompt = platform
        .prompt
        .find(raw_result.as_bytes())
        .map(|m| raw_result[m.start()..].trim().to_string())
        .unwrap_or_default();

    let result = platform.normalize_output(&raw_result, command.loggable());
    trace!("< {result}");

    let response = Response::new(command.loggable(), result, raw_result, prompt, elapsed);
    match platform.detect_failure(&response.result) {
        Some(marker) => {
            let marker = marker.to_string();
            Ok(response.with_failure(marker))
        }
        None => Ok(response),
    }
}

fn rejected_as_error(response: Response) -> Result<Response> {
    match &response.failure_message {
        None => Ok(response),
        Some(_) => Err(Error::CommandRejected {
            command: response.command.clone(),
            message: response.result.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::stream::scripted::{ScriptedStream, data};
    use crate::error::ChannelError;
    use crate::platform;
    use crate::plan::Vars;

    fn shell(stream: ScriptedStream) -> ShellChannel<ScriptedStream> {
        ShellChannel::new(stream, platform::exos().prompt, SEARCH_DEPTH, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_plain_command() {
        let stream = ScriptedStream::default()
            .reply(vec![data("enable ssh2\r\n* X440G2-48p.3 # ")]);
        let mut shell = shell(stream);

        let response = exchange(&mut shell, &platform::exos(), &Command::new("enable ssh2"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.result, "");
        assert_eq!(response.prompt, "* X440G2-48p.3 #");
    }

    #[tokio::test]
    async fn test_confirmation_is_answered() {
        let stream = ScriptedStream::default()
            .reply(vec![data(
                "save\r\nDo you want to save configuration to primary.cfg and overwrite it? (y/N) ",
            )])
            .reply(vec![data("Yes\r\nSaving configuration on master .... done!\r\n* Switch.4 # ")]);
        let written = stream.written();
        let mut shell = shell(stream);

        let response = exchange(&mut shell, &platform::exos(), &Command::new("save"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert!(response.raw_result.contains("Saving configuration"));
        assert_eq!(*written.lock().unwrap(), vec!["save", "y"]);
    }

    #[tokio::test]
    async fn test_confirmations_are_bounded() {
        let question = "Are you sure? (y/N) ";
        let mut stream = ScriptedStream::default();
        for _ in 0..=MAX_CONFIRMATIONS + 1 {
            stream = stream.reply(vec![data(question)]);
        }
        let written = stream.written();
        let mut shell = shell(stream);

        let response = exchange(&mut shell, &platform::exos(), &Command::new("reboot"))
            .await
            .unwrap();
        assert!(response.prompt.is_empty());
        // The command and one answer per allowed confirmation.
        assert_eq!(written.lock().unwrap().len(), 1 + MAX_CONFIRMATIONS);
    }

    #[tokio::test]
    async fn test_inline_input_ends_with_empty_line() {
        let stream = ScriptedStream::default()
            .reply(vec![])
            .reply(vec![])
            .reply(vec![])
            .reply(vec![data("\r\n* Switch.1 # ")]);
        let written = stream.written();
        let mut shell = shell(stream);

        let banner = Command::new("configure banner before-login save-to-configuration")
            .with_input("Authorized use only\nDisconnect now otherwise");
        exchange(&mut shell, &platform::exos(), &banner).await.unwrap();

        assert_eq!(
            *written.lock().unwrap(),
            vec![
                "configure banner before-login save-to-configuration",
                "Authorized use only",
                "Disconnect now otherwise",
                "",
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_marker_becomes_rejection() {
        let stream = ScriptedStream::default().reply(vec![data(
            "create vlan Staff tag 10\r\nError: VLAN \"Staff\" already exists.\r\n* Switch.2 # ",
        )]);
        let mut shell = shell(stream);

        let response = exchange(&mut shell, &platform::exos(), &Command::new("create vlan Staff tag 10"))
            .await
            .unwrap();
        assert_eq!(response.failure_message.as_deref(), Some("Error:"));

        let err = rejected_as_error(response).unwrap_err();
        match err {
            Error::CommandRejected { command, message } => {
                assert_eq!(command, "create vlan Staff tag 10");
                assert_eq!(message, "Error: VLAN \"Staff\" already exists.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_secret_masked_in_raw_output() {
        let mut vars = Vars::new();
        vars.set_secret("secret", "radsecret");
        let command = Command::render("configure radius netlogin primary shared-secret {secret}", &vars)
            .unwrap();
        let stream = ScriptedStream::default().reply(vec![data(
            "configure radius netlogin primary shared-secret radsecret\r\n* Switch.2 # ",
        )]);
        let mut shell = shell(stream);

        let response = exchange(&mut shell, &platform::exos(), &command).await.unwrap();
        assert!(!response.raw_result.contains("radsecret"));
        assert!(response.raw_result.contains("shared-secret ****"));
        assert_eq!(response.command, "configure radius netlogin primary shared-secret ****");
    }

    #[tokio::test]
    async fn test_command_timeout_overrides_session() {
        let stream = ScriptedStream::default()
            .reply(vec![data("download url http://x/img.xos\r\n")])
            .reply(vec![data("\r\n* Switch.1 # ")]);
        let mut shell = shell(stream);
        let limit = Duration::from_millis(20);
        let command = Command::new("download url http://x/img.xos").with_timeout(limit);

        let err = exchange(&mut shell, &platform::exos(), &command).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::PatternTimeout(d)) if d == limit));
        assert!(!shell.is_desynchronized());
    }
}
