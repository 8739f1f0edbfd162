use crate::status::DeviceStatus;
use embedded_hal::i2c::I2c;
use sensirion_i2c::i2c;

/// SEN6x errors
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error<E> {
    #[cfg_attr(feature = "thiserror", error("I2C bus error: {0:?}"))]
    /// I²C bus error
    I2c(E),
    #[cfg_attr(feature = "thiserror", error("CRC mismatch in sensor response"))]
    /// CRC checksum validation failed
    Crc,
    #[cfg_attr(
        feature = "thiserror",
        error("command not allowed in the current measurement state")
    )]
    /// Command is not allowed while measuring (or only allowed while measuring)
    NotAllowed,
    #[cfg_attr(feature = "thiserror", error("value out of range: {0}"))]
    /// Argument outside of the range accepted by the sensor
    InvalidInput(&'static str),
    #[cfg_attr(feature = "thiserror", error("sensor reports a fault: {0}"))]
    /// Device status has at least one error bit set
    DeviceFault(DeviceStatus),
    #[cfg_attr(feature = "thiserror", error("forced CO2 recalibration failed"))]
    /// Forced CO2 recalibration was rejected by the sensor
    RecalibrationFailed,
    #[cfg_attr(feature = "thiserror", error("sensor returned a string that is not UTF-8"))]
    /// Product name or serial number is not valid UTF-8
    Utf8,
}

impl<I> From<i2c::Error<I>> for Error<I::Error>
where
    I: I2c,
{
    fn from(err: i2c::Error<I>) -> Self {
        match err {
            i2c::Error::Crc => Error::Crc,
            i2c::Error::I2cWrite(e) => Error::I2c(e),
            i2c::Error::I2cRead(e) => Error::I2c(e),
        }
    }
}
