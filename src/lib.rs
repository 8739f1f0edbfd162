//! This library provides an embedded `no_std` driver for the [Sensirion SEN6x series](https://sensirion.com/products/catalog/SEN66).
//! This driver was built using [embedded-hal](https://docs.rs/embedded-hal/) traits.
//! The implementation is based on the SEN66 datasheet and tested against the SEN66.
//!
//! ## Example
//!
//! ```no_run
//! use linux_embedded_hal::{Delay, I2cdev};
//! use sen6x_rs::Sen6x;
//!
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut sensor = Sen6x::new(dev, Delay);
//!
//! println!("Product: {}", sensor.product_name().unwrap());
//! println!("Serial: {}", sensor.serial_number().unwrap());
//! println!("Device {}", sensor.device_status().unwrap());
//!
//! sensor.start_measurement().unwrap();
//! loop {
//!     if sensor.data_ready().unwrap() {
//!         match sensor.check_sensor_errors() {
//!             Ok(()) => {
//!                 let data = sensor.read_measurement().unwrap();
//!                 match data.co2 {
//!                     Some(co2) => println!("CO2: {} ppm", co2),
//!                     None => println!("CO2: initializing..."),
//!                 }
//!             }
//!             Err(e) => {
//!                 println!("Error: {:?}", e);
//!                 for (name, description) in sensor.error_status_description().unwrap() {
//!                     println!("  - {}: {}", name, description);
//!                 }
//!             }
//!         }
//!     }
//!     std::thread::sleep(std::time::Duration::from_secs(1));
//! }
//! ```
//!
//! ## Measurement state
//!
//! Commands are either allowed only in idle mode, only while measuring, or in both. The driver
//! tracks the mode and rejects a command issued in the wrong one with [`Error::NotAllowed`]
//! before it reaches the bus. Configuration setters that are idle-only (tuning parameters,
//! altitude, CO2 self-calibration) therefore require stopping measurement first; temperature
//! offset and ambient pressure can be changed while measuring.
//!
//! ## Features
//!
//! - `thiserror`: derives `Display` and `core::error::Error` for the error types.
#![cfg_attr(not(test), no_std)]

mod commands;
mod crc;
pub mod error;
pub mod monitor;
pub mod sen6x;
pub mod status;
pub mod types;

pub use error::Error;
pub use monitor::{Clock, Monitor, MonitorConfig, MonitorError, Poll, StateStore};
pub use sen6x::{Sen6x, SEN6X_I2C_ADDRESS};
pub use status::{DeviceStatus, Fault};
pub use types::{
    AlgorithmTuning, DeviceString, NumberConcentration, PressureCompensation, RawValues,
    Sen6xData, Sen6xDataRaw, TemperatureAcceleration, TemperatureOffset, Version,
    VocAlgorithmState,
};
