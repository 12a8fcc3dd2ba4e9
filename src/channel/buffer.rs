//! Accumulated process output with consume-on-match semantics.
//!
//! Output chunks arrive whenever the child writes; a waiter may not be
//! registered yet. Everything is buffered here until a pattern consumes
//! it, so no token is ever lost between commands.

/// Buffer of process output awaiting pattern evaluation.
#[derive(Debug)]
pub struct OutputBuffer {
    buffer: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Append a chunk, stripping ANSI escape sequences.
    ///
    /// The session forces TERM=xterm-256color on the child, so escapes
    /// can show up in its output.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// The unconsumed output.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop everything before `end`. Called after a match so the next
    /// wait starts just past the matched text.
    pub fn consume_to(&mut self, end: usize) {
        self.buffer.drain(..end);
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

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
