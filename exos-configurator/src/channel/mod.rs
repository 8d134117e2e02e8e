//! Interactive shell channel.
//!
//! Output from the switch is accumulated with ANSI escapes removed, and
//! only the tail of the buffer is searched for the prompt.

mod buffer;
mod shell;
pub(crate) mod stream;

pub use buffer::PatternBuffer;
pub use shell::ShellChannel;
pub use stream::ShellStream;
