//! Output buffer with tail-only pattern search.

use std::fmt;

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Accumulates shell output and finds the prompt near its end.
///
/// Escape sequences are removed as data arrives. The parser is kept
/// between calls so a sequence split across two SSH packets is still
/// recognised.
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end are searched.
    search_depth: usize,

    parser: Parser,
}

/// Keeps printable characters and line control, drops everything else.
struct Printable<'a>(&'a mut Vec<u8>);

impl Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.push(byte);
        }
    }
}

impl PatternBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Append data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        self.parser.advance(&mut Printable(&mut self.buffer), data);
    }

    /// Search the last `search_depth` bytes.
    ///
    /// Offsets are relative to the start of the whole buffer.
    pub fn find_tail(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[start..])
            .map(|m| (start + m.start(), start + m.end()))
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
