//! Per-connection receive buffer
//!
//! Accumulates raw bytes and yields complete newline-terminated messages,
//! tolerating fragments split across reads and messages longer than the
//! current capacity. Capacity doubles on demand up to a hard cap; a line
//! that would exceed the cap is a protocol violation and the caller
//! disconnects the client instead of growing forever.

/// A single buffered line exceeded the configured maximum length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineTooLong;

#[derive(Debug)]
pub(crate) struct RecvBuffer {
    data: Vec<u8>,
    used: usize,
    max_len: usize,
}

impl RecvBuffer {
    pub fn new(capacity: usize, max_len: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            used: 0,
            max_len,
        }
    }

    /// Make sure there is free tail space before a read, doubling the
    /// capacity if the buffer is full.
    pub fn ensure_space(&mut self) -> Result<(), LineTooLong> {
        if self.used < self.data.len() {
            return Ok(());
        }
        if self.data.len() >= self.max_len {
            return Err(LineTooLong);
        }
        let grown = (self.data.len() * 2).min(self.max_len);
        self.data.resize(grown, 0);
        Ok(())
    }

    /// Free tail to read into. Call [`RecvBuffer::ensure_space`] first.
    pub fn spare(&mut self) -> &mut [u8] {
        &mut self.data[self.used..]
    }

    /// Record `n` bytes just read into the spare tail.
    pub fn advance(&mut self, n: usize) {
        self.used += n;
        debug_assert!(self.used <= self.data.len());
    }

    /// Split off every complete line, newline stripped, in arrival order.
    /// Whatever follows the last newline stays buffered as the start of
    /// the next message.
    pub fn take_lines(&mut self) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.data[start..self.used].iter().position(|&b| b == b'\n') {
            lines.push(self.data[start..start + pos].to_vec());
            start += pos + 1;
        }
        if start > 0 {
            self.data.copy_within(start..self.used, 0);
            self.used -= start;
        }
        lines
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.used
    }
}
