//! Microcontroller side: listens for command lines and drives the servos.

use core::fmt::Arguments;
use core::mem;

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use embedded_io::{Read, ReadReady, Write};
use heapless::{String, Vec};
use log::{error, info, warn};

use crate::{
    JOINT_COUNT, JointId, ServoError,
    command::{LINE_TERMINATOR, PositionCommand, sub_commands},
    servo::Servo,
};

/// Longest command line accepted, terminator excluded.
pub const LINE_CAPACITY: usize = 256;
/// Pause between input polls.
pub const IDLE_DELAY_MS: u32 = 100;
/// Pause after each group of positions so the servos can get there.
pub const SETTLE_DELAY_MS: u32 = 500;

const READ_CHUNK: usize = 64;
const REPORT_CAPACITY: usize = 64;

pub struct CommandReceiver<PORT, PWM, D> {
    port: PORT,
    servos: [Servo<PWM>; JOINT_COUNT],
    delay: D,
    line: Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
}

impl<PORT, PWM, D> CommandReceiver<PORT, PWM, D>
where
    PORT: Read + ReadReady + Write,
    PWM: SetDutyCycle,
    D: DelayNs,
{
    /// `channels` are in wire order: leg0-hip, leg0-ankle, leg1-hip, ...
    pub fn new(port: PORT, channels: [PWM; JOINT_COUNT], delay: D) -> Self {
        let mut index = 0;
        let servos = channels.map(|pwm| {
            let servo = Servo::new(pwm, JointId::ALL[index]);
            index += 1;
            servo
        });
        Self {
            port,
            servos,
            delay,
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Polls forever, idling between polls. Only a reset stops it.
    pub fn run(&mut self) -> ! {
        info!("Command receiver listening");
        loop {
            self.step();
        }
    }

    /// One pass of the receive loop: handle waiting input, then idle.
    pub fn step(&mut self) {
        if let Err(e) = self.poll() {
            error!("Poll failed: {}", e);
        }
        self.delay.delay_ms(IDLE_DELAY_MS);
    }

    /// Drains the input that is already waiting and executes every line it
    /// completes. Never blocks on an empty port.
    ///
    /// Returns the number of lines executed.
    pub fn poll(&mut self) -> Result<usize, ServoError> {
        let mut executed = 0;
        let mut chunk = [0u8; READ_CHUNK];
        while self.port.read_ready().map_err(|_| ServoError::ReadError)? {
            let count = self
                .port
                .read(&mut chunk)
                .map_err(|_| ServoError::ReadError)?;
            if count == 0 {
                break;
            }
            for &byte in &chunk[..count] {
                if let Some(line) = self.push_byte(byte) {
                    self.execute_raw_line(&line);
                    executed += 1;
                }
            }
        }
        Ok(executed)
    }

    fn push_byte(&mut self, byte: u8) -> Option<Vec<u8, LINE_CAPACITY>> {
        if byte == LINE_TERMINATOR {
            let line = mem::take(&mut self.line);
            if mem::replace(&mut self.overflowed, false) {
                return None;
            }
            return Some(line);
        }
        if self.overflowed {
            return None;
        }
        if self.line.push(byte).is_err() {
            let e = ServoError::LineTooLong(LINE_CAPACITY);
            warn!("Discarding input: {}", e);
            report(&mut self.port, format_args!("{}", e));
            self.line.clear();
            self.overflowed = true;
        }
        None
    }

    fn execute_raw_line(&mut self, line: &[u8]) {
        match core::str::from_utf8(line) {
            Ok(line) => self.execute_line(line),
            Err(_) => {
                warn!("Discarding non UTF-8 command line");
                report(&mut self.port, format_args!("Invalid Position"));
            }
        }
    }

    /// Executes one command line. Groups run in order; the first malformed
    /// group abandons the rest of the line.
    pub fn execute_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        info!("Received command: {}", line);
        for command in sub_commands(line) {
            match command {
                Ok(command) => self.move_servos(&command),
                Err(e) => {
                    warn!("{}: {:?}", e, line);
                    report(&mut self.port, format_args!("Invalid Position"));
                    return;
                }
            }
        }
    }

    /// Applies one group of positions, then waits for the servos to settle.
    ///
    /// Joints beyond the number of positions given keep their output.
    pub fn move_servos(&mut self, command: &PositionCommand) {
        for (servo, &position) in self.servos.iter_mut().zip(command.positions()) {
            match servo.set_angle(position) {
                Ok(_) => {}
                Err(ServoError::OutOfBounds(position)) => {
                    warn!("{}: position {} out of bounds", servo.joint(), position);
                    report(
                        &mut self.port,
                        format_args!("Warning: Position {} out of bounds.", position),
                    );
                }
                // Channel faults are logged by the servo; keep going with the rest.
                Err(_) => {}
            }
        }
        self.delay.delay_ms(SETTLE_DELAY_MS);
    }

    pub fn servos(&self) -> &[Servo<PWM>; JOINT_COUNT] {
        &self.servos
    }

    pub fn port(&self) -> &PORT {
        &self.port
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}

/// Writes one diagnostic line back over the link.
fn report<P: Write>(port: &mut P, args: Arguments<'_>) {
    let mut message: String<REPORT_CAPACITY> = String::new();
    // Overlong messages are sent truncated.
    let _ = core::fmt::write(&mut message, args);
    let written = port
        .write_all(message.as_bytes())
        .and_then(|_| port.write_all(&[LINE_TERMINATOR]))
        .and_then(|_| port.flush());
    if written.is_err() {
        error!("Failed to write diagnostic: {}", message);
    }
}
