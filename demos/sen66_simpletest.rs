//! Read a SEN66 on a Linux I²C bus and keep its VOC algorithm state in a file.
//!
//! Environment:
//! - `SEN6X_I2C_BUS`: I²C device, default `/dev/i2c-1`
//! - `SEN6X_STATE_FILE`: where the VOC algorithm state is kept, default `voc_state.bin`
//! - `SEN6X_SAVE_INTERVAL_SECS`: seconds between state saves, default 10
//! - `RUST_LOG`: driver log level, e.g. `sen6x_rs=debug`
//!
//! Run with:
//! `cargo run --example sen66_simpletest`

use anyhow::{anyhow, Context, Result};
use linux_embedded_hal::{Delay, I2cdev};
use log::info;
use sen6x_rs::{Clock, Monitor, MonitorConfig, Poll, Sen6x, StateStore, VocAlgorithmState};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use std::{env, fs, io, thread};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

struct InstantClock(Instant);

impl Clock for InstantClock {
    fn now_ms(&mut self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

struct FileStore(PathBuf);

impl StateStore for FileStore {
    type Error = io::Error;

    fn load(&mut self) -> io::Result<Option<VocAlgorithmState>> {
        let bytes = match fs::read(&self.0) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let bytes: [u8; VocAlgorithmState::SIZE] = bytes.try_into().map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "VOC state file has wrong size")
        })?;
        Ok(Some(VocAlgorithmState::from_bytes(bytes)))
    }

    fn save(&mut self, state: &VocAlgorithmState) -> io::Result<()> {
        fs::write(&self.0, state.as_bytes())
    }
}

fn fmt_value(label: &str, value: Option<f32>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}: {:.1}{}", label, v, unit),
        None => format!("{}: initializing...", label),
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let bus = env::var("SEN6X_I2C_BUS").unwrap_or_else(|_| "/dev/i2c-1".to_string());
    let state_file = env::var("SEN6X_STATE_FILE").unwrap_or_else(|_| "voc_state.bin".to_string());
    let save_interval: u64 = match env::var("SEN6X_SAVE_INTERVAL_SECS") {
        Ok(secs) => secs
            .parse()
            .with_context(|| format!("invalid SEN6X_SAVE_INTERVAL_SECS {:?}", secs))?,
        Err(_) => 10,
    };

    let dev = I2cdev::new(&bus).with_context(|| format!("failed to open {}", bus))?;
    let mut sensor = Sen6x::new(dev, Delay);

    let product = sensor
        .product_name()
        .map_err(|e| anyhow!("failed to read product name: {:?}", e))?;
    let serial = sensor
        .serial_number()
        .map_err(|e| anyhow!("failed to read serial number: {:?}", e))?;
    let status = sensor
        .device_status()
        .map_err(|e| anyhow!("failed to read device status: {:?}", e))?;
    println!("Product: {}", product);
    println!("Serial: {}", serial);
    println!("Device {}", status);

    let config = MonitorConfig {
        save_interval_ms: save_interval * 1000,
        ..Default::default()
    };
    let mut monitor = Monitor::new(
        sensor,
        InstantClock(Instant::now()),
        FileStore(state_file.into()),
        config,
    );
    if monitor
        .start()
        .map_err(|e| anyhow!("failed to start measurement: {:?}", e))?
    {
        info!("VOC algorithm state restored");
    }

    println!("Waiting for first measurement...");
    thread::sleep(Duration::from_secs(2));

    loop {
        match monitor.poll().map_err(|e| anyhow!("{:?}", e))? {
            Poll::Pending => {}
            Poll::Sample { data, state_saved } => {
                println!("{}", fmt_value("Temperature", data.temperature, "°C"));
                println!("{}", fmt_value("Humidity", data.humidity, "%"));
                println!("{}", fmt_value("PM2.5", data.pm2_5, " µg/m³"));
                println!("{}", fmt_value("VOC Index", data.voc_index, ""));
                println!("{}", fmt_value("NOx Index", data.nox_index, ""));
                match data.co2 {
                    Some(co2) => println!("CO2: {} ppm", co2),
                    None => println!("CO2: initializing..."),
                }
                if state_saved {
                    println!("VOC state saved");
                }
                if let Some(e) = monitor.take_save_error() {
                    println!("Saving VOC state failed: {:?}", e);
                }
                println!("{}", "-".repeat(40));
            }
            Poll::Fault(status) => {
                println!("Error: {}", status);
                for (name, description) in status.descriptions() {
                    println!("  - {}: {}", name, description);
                }
                println!("{}", "-".repeat(40));
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}
