//! Runs the command receiver on a desktop serial port, with PWM channels that
//! only log. It listens on `bench_port_name` from `quadruped.json`; point the
//! control surface at the other end of a null-modem pair to try it without a
//! robot.

use std::{path::Path, time::Duration};

use log::info;
use quadruped_servo::{
    JointId,
    host::{LoggingPwm, PolledSerialPort, StdDelay, create_serial_port},
    receiver::CommandReceiver,
    surface::{ControlConfig, config::CONFIG_FILE},
};

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = ControlConfig::load_or_default(Path::new(CONFIG_FILE));
    let port = create_serial_port(
        &config.bench_port_name,
        config.baud_rate,
        Duration::from_millis(10),
    )?;
    info!("Simulating receiver on {}", config.bench_port_name);

    let channels = JointId::ALL.map(LoggingPwm::new);
    let mut receiver = CommandReceiver::new(PolledSerialPort::new(port), channels, StdDelay);
    receiver.run()
}
