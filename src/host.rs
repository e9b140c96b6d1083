//! Desktop glue: `serialport` ports behind the `embedded-io` traits, plus the
//! delay and PWM stand-ins used to run the receiver on a host.

use std::{io, thread, time::Duration};

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use embedded_io::{ErrorType, Read, ReadReady, Write};
use embedded_io_adapters::std::FromStd;
use log::info;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::JointId;

/// Blocking serial link as used by the control surface.
pub type SerialLink = FromStd<Box<dyn SerialPort>>;

pub fn create_serial_port(
    port_name: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, serialport::Error> {
    let port = serialport::new(port_name, baud_rate)
        .timeout(timeout)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .open()?;

    info!("Port opened successfully: {} at {} baud", port_name, baud_rate);
    Ok(port)
}

pub fn open_serial_link(
    port_name: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<SerialLink, serialport::Error> {
    create_serial_port(port_name, baud_rate, timeout).map(FromStd::new)
}

/// A serial port that can report pending input without blocking, which is
/// what the command receiver polls on.
pub struct PolledSerialPort {
    port: Box<dyn SerialPort>,
}

impl PolledSerialPort {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl ErrorType for PolledSerialPort {
    type Error = io::Error;
}

impl Read for PolledSerialPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        io::Read::read(&mut self.port, buf)
    }
}

impl ReadReady for PolledSerialPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.port.bytes_to_read()? > 0)
    }
}

impl Write for PolledSerialPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        io::Write::write(&mut self.port, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        io::Write::flush(&mut self.port)
    }
}

/// `DelayNs` on top of `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

/// A 16 bit PWM channel that only logs what it is told.
#[derive(Debug)]
pub struct LoggingPwm {
    joint: JointId,
    duty: u16,
}

impl LoggingPwm {
    pub fn new(joint: JointId) -> Self {
        Self { joint, duty: 0 }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl PwmErrorType for LoggingPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for LoggingPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        info!("{}: duty {}", self.joint, duty);
        self.duty = duty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servo::Servo;

    #[test]
    fn logging_pwm_keeps_full_resolution() {
        let mut servo = Servo::new(LoggingPwm::new(JointId::ALL[4]), JointId::ALL[4]);
        servo.set_angle(180).unwrap();
        assert_eq!(servo.pwm().duty(), 7864);
    }

    #[test]
    fn opening_missing_port_fails() {
        let result = open_serial_link("/dev/does-not-exist-quadruped", 115_200, Duration::from_millis(10));
        assert!(result.is_err());
    }
}
