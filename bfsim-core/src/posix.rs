use std::collections::VecDeque;

use thiserror::Error;

pub const STDIN_FD: u32 = 0;
pub const STDOUT_FD: u32 = 1;

/// Byte produced for each missing byte once standard input is exhausted.
///
/// End-of-input behavior is left unspecified by the guest architecture; this
/// model commits to a zero fill so exploration stays deterministic. Callers
/// must not treat the value as an architectural guarantee.
pub const EOF_FILL_BYTE: u8 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("unsupported file descriptor {fd} for {op}")]
    BadFd { fd: u32, op: &'static str },
}

/// Standard-stream model for one machine state: consume-only stdin,
/// append-only stdout. Forked states clone the streams along with the rest
/// of the state, so paths never share a cursor.
#[derive(Debug, Clone, Default)]
pub struct Posix {
    stdin: VecDeque<u8>,
    stdout: Vec<u8>,
}

impl Posix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_stdin(&mut self, bytes: &[u8]) {
        self.stdin.extend(bytes.iter().copied());
    }

    /// Read `len` bytes from `fd`. Exhausted input yields [`EOF_FILL_BYTE`]
    /// for each missing byte rather than an error.
    pub fn read(&mut self, fd: u32, len: usize) -> Result<Vec<u8>, StreamError> {
        if fd != STDIN_FD {
            return Err(StreamError::BadFd { fd, op: "read" });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.stdin.pop_front().unwrap_or(EOF_FILL_BYTE));
        }
        Ok(out)
    }

    /// Append `bytes` to `fd`. Returns the number of bytes written.
    pub fn write(&mut self, fd: u32, bytes: &[u8]) -> Result<usize, StreamError> {
        if fd != STDOUT_FD {
            return Err(StreamError::BadFd { fd, op: "write" });
        }
        self.stdout.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Everything written to stdout so far, in program order.
    pub fn stdout_bytes(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stdin_remaining(&self) -> usize {
        self.stdin.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_consume_stdin_in_order() {
        let mut p = Posix::new();
        p.feed_stdin(b"ab");
        assert_eq!(p.read(STDIN_FD, 1).unwrap(), b"a");
        assert_eq!(p.read(STDIN_FD, 1).unwrap(), b"b");
        assert_eq!(p.stdin_remaining(), 0);
    }

    #[test]
    fn exhausted_stdin_yields_the_fill_byte() {
        let mut p = Posix::new();
        p.feed_stdin(b"x");
        assert_eq!(p.read(STDIN_FD, 3).unwrap(), vec![b'x', EOF_FILL_BYTE, EOF_FILL_BYTE]);
    }

    #[test]
    fn writes_append_to_stdout() {
        let mut p = Posix::new();
        assert_eq!(p.write(STDOUT_FD, b"hi").unwrap(), 2);
        assert_eq!(p.write(STDOUT_FD, b"!").unwrap(), 1);
        assert_eq!(p.stdout_bytes(), b"hi!");
    }

    #[test]
    fn only_the_standard_fds_exist() {
        let mut p = Posix::new();
        assert_eq!(
            p.read(1, 1),
            Err(StreamError::BadFd { fd: 1, op: "read" })
        );
        assert_eq!(
            p.write(2, b"x"),
            Err(StreamError::BadFd { fd: 2, op: "write" })
        );
    }
}
