//! ExtremeXOS CLI definition: prompts, confirmations and error markers.

use std::fmt;

use regex::bytes::Regex;

/// What the driver needs to know about a switch CLI.
#[derive(Clone)]
pub struct PlatformDefinition {
    pub name: String,

    /// Matches the CLI prompt at the end of output.
    pub prompt: Regex,

    /// Matches a `(y/N)` style confirmation question at the end of output.
    pub confirm: Regex,

    /// Sent in reply to a confirmation question.
    pub confirm_answer: String,

    /// Output containing any of these means the command was rejected.
    pub failed_when_contains: Vec<String>,

    /// Commands run right after the shell opens.
    pub on_open_commands: Vec<String>,

    pub terminal_width: u32,

    pub terminal_height: u32,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>, prompt: &str, confirm: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt: Regex::new(prompt)?,
            confirm: Regex::new(confirm)?,
            confirm_answer: "y".to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        })
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// First failure marker found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Strip the command echo from the start and the prompt line from the end.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = raw.trim_start_matches(['\r', '\n']);
        let output = output
            .strip_prefix(command)
            .unwrap_or(output)
            .trim_start_matches(['\r', '\n']);

        let body = match output.rfind('\n') {
            Some(pos) => &output[..pos],
            None if self.prompt.is_match(output.as_bytes()) => "",
            None => output,
        };
        body.trim_end_matches(['\r', '\n']).replace("\r\n", "\n")
    }
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("prompt", &self.prompt.as_str())
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .finish()
    }
}

/// ExtremeXOS.
///
/// Prompts look like `X440G2-48p.3 # `, with a leading `* ` when the
/// configuration is unsaved, `Slot-1 Stack.2 # ` on stacks and `>` for
/// non-admin accounts.
pub fn exos() -> PlatformDefinition {
    PlatformDefinition::new(
        "extreme_exos",
        r"(?m)^(?:\([\w-]+\) )?(?:\* )?[\w\-. :]*\.\d+ ?[#>]\s*\z",
        r"\((?:y/N|Y/n|y/n|y - yes[^)]*)\)\s*:?\s*\z",
    )
    .unwrap()
    .with_failure_pattern("%% Invalid input")
    .with_failure_pattern("%% Incomplete command")
    .with_failure_pattern("%% Ambiguous command")
    .with_failure_pattern("%% Unrecognized command")
    .with_failure_pattern("Error:")
    .with_on_open_command("disable clipaging")
    .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exos_platform() {
        let platform = exos();
        assert_eq!(platform.name, "extreme_exos");
        assert_eq!(platform.on_open_commands, vec!["disable clipaging"]);
        assert_eq!(platform.failed_when_contains.len(), 5);
    }

    #[test]
    fn test_prompt_match() {
        let prompt = exos().prompt;
        assert!(prompt.is_match(b"X440G2-48p.3 # "));
        assert!(prompt.is_match(b"* X440G2-48p.3 # "));
        assert!(prompt.is_match(b"Slot-1 Stack.12 # "));
        assert!(prompt.is_match(b"(pending-AAA) X450G2.1 # "));
        assert!(prompt.is_match(b"X440G2.1 > "));
        assert!(prompt.is_match(b"some output\r\n* Switch.5 # "));
        assert!(!prompt.is_match(b"Switch # "));
        // Prompt must be at the very end.
        assert!(!prompt.is_match(b"Switch.1 # \r\nmore output"));
    }

    #[test]
    fn test_confirm_match() {
        let confirm = exos().confirm;
        assert!(confirm.is_match(
            b"Do you want to save configuration to primary.cfg and overwrite it? (y/N) "
        ));
        assert!(confirm.is_match(b"Are you sure you want to reboot the switch? (y/N) "));
        assert!(confirm.is_match(
            b"Do you want to install image after downloading? (y - yes, n - no, <cr> - cancel) "
        ));
        assert!(!confirm.is_match(b"Switch.1 # "));
    }

    #[test]
    fn test_failure_detection() {
        let platform = exos();
        assert_eq!(
            platform.detect_failure("\n%% Invalid input detected at '^' marker."),
            Some("%% Invalid input")
        );
        assert_eq!(
            platform.detect_failure("Error: VLAN Staff does not exist"),
            Some("Error:")
        );
        assert_eq!(platform.detect_failure("Default    1  ----"), None);
    }

    #[test]
    fn test_normalize_output() {
        let platform = exos();
        let raw = "show vlan | include \"^AV \"\r\nAV   15  ------\r\n* Switch.4 # ";
        assert_eq!(
            platform.normalize_output(raw, "show vlan | include \"^AV \""),
            "AV   15  ------"
        );

        let raw = "enable ssh2\r\n* Switch.5 # ";
        assert_eq!(platform.normalize_output(raw, "enable ssh2"), "");
    }
}
