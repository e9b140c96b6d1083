use embedded_hal::pwm::SetDutyCycle;
use log::{debug, error};

use crate::{JointId, MAX_ANGLE, MIN_ANGLE, ServoError};

pub const MIN_PULSE_US: u32 = 500;
pub const MAX_PULSE_US: u32 = 2400;
/// Servo frame period (50 Hz), in microseconds.
pub const PERIOD_US: u32 = 20_000;
pub const DUTY_FULL_SCALE: u16 = u16::MAX;

const ANGLE_SPAN: u32 = MAX_ANGLE as u32;

/// Pulse width for `angle` degrees, rounded down to whole microseconds.
///
/// `angle` is expected to be in `0..=180`.
pub fn pulse_width_us(angle: u8) -> u32 {
    MIN_PULSE_US + (angle as u32 * (MAX_PULSE_US - MIN_PULSE_US)) / ANGLE_SPAN
}

/// 16 bit duty value holding a servo at `angle` degrees.
///
/// Equal to `floor((pulse / 20000) * 65535)` with the unrounded pulse width.
/// Computed on the exact fraction so no float support is needed on the MCU:
///
/// ```text
/// duty = (500 * 180 + 1900 * angle) * 65535 / (180 * 20000)
/// ```
pub fn duty_for_angle(angle: u8) -> u16 {
    let pulse_scaled = (MIN_PULSE_US * ANGLE_SPAN + angle as u32 * (MAX_PULSE_US - MIN_PULSE_US)) as u64;
    let duty = pulse_scaled * DUTY_FULL_SCALE as u64 / (ANGLE_SPAN as u64 * PERIOD_US as u64);
    duty as u16
}

pub fn validate_angle(position: i64) -> Result<u8, ServoError> {
    if (MIN_ANGLE..=MAX_ANGLE).contains(&position) {
        Ok(position as u8)
    } else {
        Err(ServoError::OutOfBounds(position))
    }
}

#[derive(Debug)]
pub struct Servo<PWM> {
    pwm: PWM,
    joint: JointId,
    angle: Option<u8>,
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, joint: JointId) -> Self {
        Self {
            pwm,
            joint,
            angle: None,
        }
    }

    /// Drives the servo to `position` degrees and returns the duty written.
    ///
    /// Out of range positions are rejected without touching the channel, so
    /// the previous output keeps holding.
    pub fn set_angle(&mut self, position: i64) -> Result<u16, ServoError> {
        let angle = validate_angle(position)?;
        let duty = duty_for_angle(angle);
        debug!("{}: angle {} -> duty {}", self.joint, angle, duty);

        // The fraction maps onto whatever resolution the channel has; on a
        // 16 bit channel this writes `duty` unchanged.
        if let Err(e) = self.pwm.set_duty_cycle_fraction(duty, DUTY_FULL_SCALE) {
            error!("{} Error writing duty {}: {:?}", self.joint, duty, e);
            return Err(ServoError::PwmError);
        }
        self.angle = Some(angle);
        Ok(duty)
    }

    /// Last angle successfully written, if any.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn joint(&self) -> JointId {
        self.joint
    }

    pub fn pwm(&self) -> &PWM {
        &self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{ErrorKind, ErrorType};
    use std::vec::Vec;

    struct RecordingPwm {
        max: u16,
        duties: Vec<u16>,
    }

    impl ErrorType for RecordingPwm {
        type Error = core::convert::Infallible;
    }

    impl SetDutyCycle for RecordingPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duties.push(duty);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Fault;

    impl embedded_hal::pwm::Error for Fault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPwm;

    impl ErrorType for BrokenPwm {
        type Error = Fault;
    }

    impl SetDutyCycle for BrokenPwm {
        fn max_duty_cycle(&self) -> u16 {
            u16::MAX
        }

        fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
            Err(Fault)
        }
    }

    fn float_duty(angle: u8) -> u16 {
        let pulse = 500.0 + (angle as f64 / 180.0) * (2400.0 - 500.0);
        ((pulse / 20000.0) * 65535.0) as u16
    }

    #[test]
    fn pulse_endpoints_and_monotonic() {
        assert_eq!(pulse_width_us(0), 500);
        assert_eq!(pulse_width_us(90), 1450);
        assert_eq!(pulse_width_us(180), 2400);
        for angle in 1..=180u8 {
            assert!(pulse_width_us(angle) >= pulse_width_us(angle - 1));
        }
    }

    #[test]
    fn duty_endpoints() {
        assert_eq!(duty_for_angle(0), 1638);
        assert_eq!(duty_for_angle(180), 7864);
        assert_eq!(duty_for_angle(90), 4751);
    }

    #[test]
    fn duty_matches_floating_formula() {
        for angle in 0..=180u8 {
            assert_eq!(duty_for_angle(angle), float_duty(angle), "angle {}", angle);
        }
    }

    #[test]
    fn set_angle_writes_duty() {
        let pwm = RecordingPwm {
            max: u16::MAX,
            duties: Vec::new(),
        };
        let mut servo = Servo::new(pwm, JointId::ALL[0]);
        assert_eq!(servo.set_angle(10), Ok(1984));
        assert_eq!(servo.angle(), Some(10));
        assert_eq!(servo.pwm().duties, [1984]);
    }

    #[test]
    fn set_angle_scales_to_channel_resolution() {
        let pwm = RecordingPwm {
            max: 1000,
            duties: Vec::new(),
        };
        let mut servo = Servo::new(pwm, JointId::ALL[1]);
        servo.set_angle(180).unwrap();
        // 7864 / 65535 of 1000
        assert_eq!(servo.pwm().duties, [119]);
    }

    #[test]
    fn out_of_range_leaves_channel_alone() {
        let pwm = RecordingPwm {
            max: u16::MAX,
            duties: Vec::new(),
        };
        let mut servo = Servo::new(pwm, JointId::ALL[2]);
        servo.set_angle(45).unwrap();
        assert_eq!(servo.set_angle(181), Err(ServoError::OutOfBounds(181)));
        assert_eq!(servo.set_angle(-1), Err(ServoError::OutOfBounds(-1)));
        assert_eq!(servo.angle(), Some(45));
        assert_eq!(servo.pwm().duties.len(), 1);
    }

    #[test]
    fn channel_failure_is_reported() {
        let mut servo = Servo::new(BrokenPwm, JointId::ALL[5]);
        assert_eq!(servo.set_angle(90), Err(ServoError::PwmError));
        assert_eq!(servo.angle(), None);
    }
}
