//! Backend that records commands instead of sending them.

use std::future::Future;

use log::info;

use super::CommandInterface;
use super::response::Response;
use crate::error::Result;
use crate::plan::Command;

/// Records every command and answers with empty output.
///
/// With empty output every VLAN guard sees the VLAN as missing and the
/// account guard finds no `user` account.
#[derive(Debug, Default)]
pub struct DryRun {
    sent: Vec<Command>,
    echo: bool,
}

impl DryRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print each command to stdout as it is recorded.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn sent(&self) -> &[Command] {
        &self.sent
    }
}

impl CommandInterface for DryRun {
    fn execute(&mut self, command: &Command) -> impl Future<Output = Result<Response>> + Send {
        info!("dry-run: {}", command.loggable());
        if self.echo {
            println!("{}", command.loggable());
            if let Some(input) = &command.input {
                for line in input.lines() {
                    println!("    {line}");
                }
            }
        }
        self.sent.push(command.clone());
        std::future::ready(Ok(Response::empty(command.loggable())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Vars;

    #[tokio::test]
    async fn test_records_commands() {
        let mut dry = DryRun::new();
        let vars = Vars::new().with("ports", "1-24");
        let command = Command::render("enable lldp ports {ports}", &vars).unwrap();

        let response = dry.execute(&command).await.unwrap();
        assert!(response.is_success());
        assert!(response.result.is_empty());
        assert_eq!(dry.sent().len(), 1);
        assert_eq!(dry.sent()[0].line, "enable lldp ports 1-24");
    }

    #[tokio::test]
    async fn test_response_masks_secrets() {
        let mut dry = DryRun::new();
        let mut vars = Vars::new();
        vars.set_secret("secret", "radsecret");
        let command = Command::render("configure radius 3 shared-secret {secret}", &vars).unwrap();

        let response = dry.execute(&command).await.unwrap();
        assert_eq!(response.command, "configure radius 3 shared-secret ****");
    }
}
