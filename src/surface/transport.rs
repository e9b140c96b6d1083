use std::{
    fmt::Display,
    thread,
    time::{Duration, Instant},
};

use embedded_io::{Error as _, ErrorKind, Read, Write};
use log::{debug, error, info, warn};

use crate::command::LINE_TERMINATOR;
use crate::host::{SerialLink, open_serial_link};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Not connected to the serial port.")]
    NotConnected,
    #[error("Error opening serial port {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("Failed to send command: {0:?}")]
    Write(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub receive_timeout: Duration,
    pub send_delay: Duration,
}

/// Owns the serial link to the robot.
///
/// A failed write drops the link, so the operator has to reconnect before
/// anything else is sent.
pub struct Transport<P> {
    settings: LinkSettings,
    link: Option<P>,
}

impl<P> Transport<P> {
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            link: None,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn status(&self) -> LinkStatus {
        if self.link.is_some() {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn link(&self) -> Option<&P> {
        self.link.as_ref()
    }

    pub fn close(&mut self) {
        if self.link.take().is_some() {
            info!("Connection to {} closed.", self.settings.port_name);
        }
    }
}

impl<P: Read + Write> Transport<P> {
    /// Opens a new link with `open`, replacing any current one. On failure
    /// the transport stays disconnected.
    pub fn connect_with<F, E>(&mut self, open: F) -> Result<(), LinkError>
    where
        F: FnOnce(&LinkSettings) -> Result<P, E>,
        E: Display,
    {
        self.close();
        match open(&self.settings) {
            Ok(port) => {
                info!(
                    "Connected to {} at {} baud.",
                    self.settings.port_name, self.settings.baud_rate
                );
                self.link = Some(port);
                Ok(())
            }
            Err(e) => {
                error!("Error opening serial port {}: {}", self.settings.port_name, e);
                Err(LinkError::Open {
                    port: self.settings.port_name.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Writes `text` as is, then waits out the send delay.
    pub fn send(&mut self, text: &str) -> Result<(), LinkError> {
        let port = self.link.as_mut().ok_or(LinkError::NotConnected)?;
        let written = port
            .write_all(text.as_bytes())
            .and_then(|_| port.flush());
        if let Err(e) = written {
            error!("Error sending command: {:?}", e);
            self.close();
            return Err(LinkError::Write(e.kind()));
        }
        info!("Sent positions: {}", text.trim_end());
        if !self.settings.send_delay.is_zero() {
            thread::sleep(self.settings.send_delay);
        }
        Ok(())
    }

    /// Reads one reply line, trimmed. Timeouts, read errors and invalid UTF-8
    /// all read as an empty string.
    ///
    /// Takes at most `receive_timeout` plus one read of the underlying port.
    pub fn receive(&mut self) -> String {
        let Some(port) = self.link.as_mut() else {
            return String::new();
        };
        let deadline = Instant::now() + self.settings.receive_timeout;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == LINE_TERMINATOR => break,
                Ok(_) => line.push(byte[0]),
                // A single read only waits for a slice of the deadline.
                Err(e) if e.kind() == ErrorKind::TimedOut => {}
                Err(e) => {
                    warn!("Error receiving data: {:?}", e);
                    return String::new();
                }
            }
            if Instant::now() >= deadline {
                debug!("Reply not terminated within {:?}", self.settings.receive_timeout);
                return String::new();
            }
        }
        match String::from_utf8(line) {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                warn!("Error decoding reply: {}", e);
                String::new()
            }
        }
    }
}

/// How long one read on a serial link may block. [`Transport::receive`] keeps
/// reading until its own deadline, so this only bounds the overshoot.
pub const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub trait OpenLink: Sized {
    type OpenError: Display;

    fn open(settings: &LinkSettings) -> Result<Self, Self::OpenError>;
}

impl OpenLink for SerialLink {
    type OpenError = serialport::Error;

    fn open(settings: &LinkSettings) -> Result<Self, Self::OpenError> {
        open_serial_link(
            &settings.port_name,
            settings.baud_rate,
            settings.receive_timeout.min(READ_TIMEOUT),
        )
    }
}

impl<P: Read + Write + OpenLink> Transport<P> {
    pub fn connect(&mut self) -> Result<(), LinkError> {
        self.connect_with(P::open)
    }
}
