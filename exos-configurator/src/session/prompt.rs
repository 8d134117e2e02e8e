//! Operator terminal access.

use std::io::{self, BufRead, Write};

use secrecy::SecretString;

/// Line-oriented operator I/O.
///
/// `Ok(None)` from a read means end of input; the session ends as if the
/// operator chose exit.
pub trait Prompter {
    /// Show `prompt` and read one line without its line terminator.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Read a value without echoing it.
    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<SecretString>>;

    /// Print text followed by a newline.
    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Show a message and wait for Enter.
    fn pause(&mut self, message: &str) -> io::Result<bool> {
        Ok(self.read_line(message)?.is_some())
    }
}

/// Prompter over any reader/writer pair.
///
/// Secrets are read as ordinary lines, which makes it suitable for scripted
/// input and tests.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        self.next_line()
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<SecretString>> {
        Ok(self.read_line(prompt)?.map(SecretString::from))
    }

    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{text}")
    }
}

/// The interactive terminal: stdin/stdout, with hidden secret input.
pub struct TerminalPrompter {
    lines: LinePrompter<io::StdinLock<'static>, io::Stdout>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            lines: LinePrompter::new(io::stdin().lock(), io::stdout()),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.lines.read_line(prompt)
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<SecretString>> {
        match rpassword::prompt_password(prompt) {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn show(&mut self, text: &str) -> io::Result<()> {
        self.lines.show(text)
    }
}
