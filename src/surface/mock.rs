//! In-memory serial link for tests.

use std::collections::VecDeque;

use embedded_io::{ErrorKind, ErrorType, Read, Write};

use super::transport::{LinkSettings, OpenLink};

#[derive(Debug)]
pub(crate) struct MockError(pub ErrorKind);

impl embedded_io::Error for MockError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Records what is written and plays back a canned reply. An exhausted
/// reply reads as a timeout, like a quiet serial port.
#[derive(Debug, Default)]
pub(crate) struct MockLink {
    written: Vec<u8>,
    reply: VecDeque<u8>,
    fail_writes: bool,
    timeouts: usize,
}

impl MockLink {
    /// Port name that fails to open.
    pub(crate) const MISSING_PORT: &'static str = "missing";

    pub(crate) fn with_reply(reply: &str) -> Self {
        Self::with_bytes(reply.as_bytes())
    }

    pub(crate) fn with_bytes(reply: &[u8]) -> Self {
        Self {
            reply: reply.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Times out on the next `count` reads before serving the reply.
    pub(crate) fn timing_out_first(mut self, count: usize) -> Self {
        self.timeouts = count;
        self
    }

    pub(crate) fn written(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl ErrorType for MockLink {
    type Error = MockError;
}

impl Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.timeouts > 0 {
            self.timeouts -= 1;
            return Err(MockError(ErrorKind::TimedOut));
        }
        match self.reply.pop_front() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(MockError(ErrorKind::TimedOut)),
        }
    }
}

impl Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockError(ErrorKind::BrokenPipe));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl OpenLink for MockLink {
    type OpenError = String;

    fn open(settings: &LinkSettings) -> Result<Self, Self::OpenError> {
        if settings.port_name == Self::MISSING_PORT {
            Err(format!("no such port: {}", settings.port_name))
        } else {
            Ok(Self::default())
        }
    }
}
