use crate::commands::Command;
use crate::crc::word_with_crc;
use crate::error::Error;
use crate::status::DeviceStatus;
use crate::types::{
    word, AlgorithmTuning, DeviceString, NumberConcentration, PressureCompensation, RawValues,
    Sen6xData, Sen6xDataRaw, TemperatureAcceleration, TemperatureOffset, Version,
    VocAlgorithmState,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};
use sensirion_i2c::i2c;

/// Default I²C address of the SEN6x family.
pub const SEN6X_I2C_ADDRESS: u8 = 0x6B;

/// Largest argument list of any command.
const MAX_ARGS: usize = 6;

/// SEN6x sensor instance. Use related methods to take measurements.
pub struct Sen6x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    is_running: bool,
    /// Device status was checked and clean for the sample about to be read.
    status_checked: bool,
    pressure_compensation: Option<PressureCompensation>,
}

impl<I2C, D, E> Sen6x<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Creates a new sensor on the default address. The sensor is assumed idle.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, SEN6X_I2C_ADDRESS)
    }

    /// Creates a new sensor on a non-default address.
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Sen6x {
            i2c,
            delay,
            address,
            is_running: false,
            status_checked: false,
            pressure_compensation: None,
        }
    }

    /// Returns the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Whether the driver has put the sensor in measurement mode.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Starts continuous measurement. Fails with [`Error::NotAllowed`] if already measuring.
    pub fn start_measurement(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StartMeasurement)?;
        self.is_running = true;
        self.status_checked = false;
        info!("sen6x: measurement started");
        Ok(())
    }

    /// Returns the sensor to idle mode.
    pub fn stop_measurement(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StopMeasurement)?;
        self.is_running = false;
        self.status_checked = false;
        info!("sen6x: measurement stopped");
        Ok(())
    }

    /// Whether a new sample is available. The sensor clears the flag when the sample is read.
    pub fn data_ready(&mut self) -> Result<bool, Error<E>> {
        let mut data = [0; 3];
        self.delayed_read_cmd(Command::GetDataReady, &mut data)?;
        let ready = data[1] == 0x01;
        if ready {
            // a new sample needs a new status check
            self.status_checked = false;
        }
        Ok(ready)
    }

    /// Fails with [`Error::DeviceFault`] if the device status has an error bit set.
    ///
    /// A clean check covers the next [`Sen6x::read_measurement`], unless [`Sen6x::data_ready`]
    /// reports a newer sample first.
    pub fn check_sensor_errors(&mut self) -> Result<(), Error<E>> {
        self.status_checked = false;
        let status = self.device_status()?;
        if status.has_error() {
            warn!("sen6x: device fault, {}", status);
            return Err(Error::DeviceFault(status));
        }
        if status.has_warning() {
            warn!("sen6x: device warning, {}", status);
        }
        self.status_checked = true;
        Ok(())
    }

    /// Reads the current sample.
    ///
    /// If [`Sen6x::check_sensor_errors`] was not called for this sample it is called first, so a
    /// sample is never returned while the device reports a fault.
    pub fn read_measurement(&mut self) -> Result<Sen6xData, Error<E>> {
        if !self.is_running {
            return Err(Error::NotAllowed);
        }
        if !self.status_checked {
            self.check_sensor_errors()?;
        }
        self.status_checked = false;
        Ok(self.read_measurement_raw()?.into())
    }

    /// Reads the current sample without scaling and without checking the device status.
    pub fn read_measurement_raw(&mut self) -> Result<Sen6xDataRaw, Error<E>> {
        let mut data = [0; 27];
        self.delayed_read_cmd(Command::ReadMeasuredValues, &mut data)?;
        Ok(Sen6xDataRaw::from_words(&data))
    }

    /// Reads the particle number concentrations.
    pub fn read_number_concentration(&mut self) -> Result<NumberConcentration, Error<E>> {
        let mut data = [0; 15];
        self.delayed_read_cmd(Command::ReadNumberConcentration, &mut data)?;
        Ok(NumberConcentration::from_words(&data))
    }

    /// Reads the raw RH/T, gas and CO2 signals.
    pub fn read_raw_values(&mut self) -> Result<RawValues, Error<E>> {
        let mut data = [0; 15];
        self.delayed_read_cmd(Command::ReadMeasuredRawValues, &mut data)?;
        Ok(RawValues::from_words(&data))
    }

    /// Product name, e.g. `SEN66`.
    pub fn product_name(&mut self) -> Result<DeviceString, Error<E>> {
        let mut data = [0; 48];
        self.delayed_read_cmd(Command::GetProductName, &mut data)?;
        DeviceString::from_words(&data).ok_or(Error::Utf8)
    }

    /// Serial number of the module.
    pub fn serial_number(&mut self) -> Result<DeviceString, Error<E>> {
        let mut data = [0; 48];
        self.delayed_read_cmd(Command::GetSerialNumber, &mut data)?;
        DeviceString::from_words(&data).ok_or(Error::Utf8)
    }

    /// Firmware version.
    pub fn version(&mut self) -> Result<Version, Error<E>> {
        let mut data = [0; 3];
        self.delayed_read_cmd(Command::GetVersion, &mut data)?;
        Ok(Version {
            major: data[0],
            minor: data[1],
        })
    }

    /// Reads the device status register. Never cached.
    pub fn device_status(&mut self) -> Result<DeviceStatus, Error<E>> {
        let mut data = [0; 6];
        self.delayed_read_cmd(Command::ReadDeviceStatus, &mut data)?;
        Ok(DeviceStatus::from_words(&data))
    }

    /// Reads the device status and describes each set bit as `(name, description)`.
    pub fn error_status_description(
        &mut self,
    ) -> Result<impl Iterator<Item = (&'static str, &'static str)>, Error<E>> {
        Ok(self.device_status()?.descriptions())
    }

    /// Reads and clears the device status, returning the status before clearing.
    ///
    /// Only latched bits are cleared; a condition that persists is reported again.
    pub fn clear_device_status(&mut self) -> Result<DeviceStatus, Error<E>> {
        let mut data = [0; 6];
        self.delayed_read_cmd(Command::ReadAndClearDeviceStatus, &mut data)?;
        self.status_checked = false;
        Ok(DeviceStatus::from_words(&data))
    }

    /// Resets the device. Measurement stops and volatile settings are lost.
    pub fn device_reset(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::DeviceReset)?;
        self.is_running = false;
        self.status_checked = false;
        self.pressure_compensation = None;
        Ok(())
    }

    /// Runs the fan at maximum speed for about 10 s. Idle mode only.
    pub fn start_fan_cleaning(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StartFanCleaning)
    }

    /// Heats the RH/T sensor for about 1 s. Idle mode only.
    pub fn activate_sht_heater(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::ActivateShtHeater)
    }

    /// Applies a temperature offset. Allowed while measuring and effective immediately.
    pub fn set_temperature_offset(&mut self, offset: TemperatureOffset) -> Result<(), Error<E>> {
        let words = offset.to_words().map_err(Error::InvalidInput)?;
        self.write_command_with_args(Command::SetTemperatureOffset, &words)
    }

    /// Idle mode only.
    pub fn set_temperature_acceleration(
        &mut self,
        acceleration: TemperatureAcceleration,
    ) -> Result<(), Error<E>> {
        let words = acceleration.to_words().map_err(Error::InvalidInput)?;
        self.write_command_with_args(Command::SetTemperatureAcceleration, &words)
    }

    /// Current VOC index algorithm parameters. Idle mode only.
    pub fn voc_algorithm_tuning(&mut self) -> Result<AlgorithmTuning, Error<E>> {
        let mut data = [0; 18];
        self.delayed_read_cmd(Command::GetVocAlgorithmTuning, &mut data)?;
        Ok(AlgorithmTuning::from_words(&data))
    }

    /// Idle mode only; takes effect when measurement is started.
    pub fn set_voc_algorithm_tuning(&mut self, tuning: AlgorithmTuning) -> Result<(), Error<E>> {
        let words = tuning.voc_words().map_err(Error::InvalidInput)?;
        self.write_command_with_args(Command::SetVocAlgorithmTuning, &words)
    }

    /// Current NOx index algorithm parameters. Idle mode only.
    pub fn nox_algorithm_tuning(&mut self) -> Result<AlgorithmTuning, Error<E>> {
        let mut data = [0; 18];
        self.delayed_read_cmd(Command::GetNoxAlgorithmTuning, &mut data)?;
        Ok(AlgorithmTuning::from_words(&data))
    }

    /// Idle mode only; takes effect when measurement is started.
    pub fn set_nox_algorithm_tuning(&mut self, tuning: AlgorithmTuning) -> Result<(), Error<E>> {
        let words = tuning.nox_words().map_err(Error::InvalidInput)?;
        self.write_command_with_args(Command::SetNoxAlgorithmTuning, &words)
    }

    /// Reads the VOC algorithm state. Allowed in both modes.
    pub fn voc_algorithm_state(&mut self) -> Result<VocAlgorithmState, Error<E>> {
        let mut data = [0; 12];
        self.delayed_read_cmd(Command::GetVocAlgorithmState, &mut data)?;
        Ok(VocAlgorithmState::from_words(&data))
    }

    /// Restores a saved VOC algorithm state. Idle mode only, right before starting measurement.
    pub fn set_voc_algorithm_state(&mut self, state: VocAlgorithmState) -> Result<(), Error<E>> {
        self.write_command_with_args(Command::SetVocAlgorithmState, &state.to_words())
    }

    /// Recalibrates the CO2 sensor to `target_ppm` and returns the applied correction [ppm].
    ///
    /// Idle mode only. The sensor must have been measuring in a stable environment for at least
    /// three minutes before stopping.
    pub fn perform_forced_co2_recalibration(&mut self, target_ppm: u16) -> Result<i16, Error<E>> {
        self.write_command_with_args(Command::PerformForcedCo2Recalibration, &[target_ppm])?;
        let mut data = [0; 3];
        i2c::read_words_with_crc(&mut self.i2c, self.address, &mut data)?;
        let correction = word(&data, 0);
        if correction == 0xFFFF {
            warn!("sen6x: forced CO2 recalibration failed");
            return Err(Error::RecalibrationFailed);
        }
        Ok((i32::from(correction) - 0x8000) as i16)
    }

    /// Whether automatic self-calibration of the CO2 sensor is enabled. Idle mode only.
    pub fn co2_automatic_self_calibration(&mut self) -> Result<bool, Error<E>> {
        let mut data = [0; 3];
        self.delayed_read_cmd(Command::GetCo2AutomaticSelfCalibration, &mut data)?;
        Ok(data[1] == 0x01)
    }

    /// Idle mode only.
    pub fn set_co2_automatic_self_calibration(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.write_command_with_args(Command::SetCo2AutomaticSelfCalibration, &[enabled as u16])
    }

    /// Ambient pressure used for CO2 compensation [hPa].
    pub fn ambient_pressure(&mut self) -> Result<u16, Error<E>> {
        let mut data = [0; 3];
        self.delayed_read_cmd(Command::GetAmbientPressure, &mut data)?;
        Ok(word(&data, 0))
    }

    /// Sets the ambient pressure [hPa], `700..=1200`.
    ///
    /// Allowed while measuring, effective from the next measurement cycle. Overrides any
    /// altitude-based compensation until the sensor is reset or power cycled.
    pub fn set_ambient_pressure(&mut self, pressure_hpa: u16) -> Result<(), Error<E>> {
        if !(700..=1200).contains(&pressure_hpa) {
            return Err(Error::InvalidInput("ambient pressure"));
        }
        self.write_command_with_args(Command::SetAmbientPressure, &[pressure_hpa])?;
        self.pressure_compensation = Some(PressureCompensation::AmbientPressure(pressure_hpa));
        Ok(())
    }

    /// Sensor altitude above sea level [m].
    pub fn sensor_altitude(&mut self) -> Result<u16, Error<E>> {
        let mut data = [0; 3];
        self.delayed_read_cmd(Command::GetSensorAltitude, &mut data)?;
        Ok(word(&data, 0))
    }

    /// Sets the sensor altitude [m], `0..=3000`.
    ///
    /// Idle mode only, effective when measurement is started. Has no effect on compensation
    /// once an ambient pressure was set.
    pub fn set_sensor_altitude(&mut self, altitude_m: u16) -> Result<(), Error<E>> {
        if altitude_m > 3000 {
            return Err(Error::InvalidInput("sensor altitude"));
        }
        self.write_command_with_args(Command::SetSensorAltitude, &[altitude_m])?;
        match self.pressure_compensation {
            Some(PressureCompensation::AmbientPressure(_)) => {
                debug!("sen6x: altitude stored, ambient pressure stays in effect")
            }
            _ => self.pressure_compensation = Some(PressureCompensation::Altitude(altitude_m)),
        }
        Ok(())
    }

    /// Pressure compensation set through this driver, if any.
    pub fn pressure_compensation(&self) -> Option<PressureCompensation> {
        self.pressure_compensation
    }

    fn write_command(&mut self, command: Command) -> Result<(), Error<E>> {
        self.write_command_with_args(command, &[])
    }

    /// Sends the command followed by CRC-protected argument words and waits its execution time.
    fn write_command_with_args(&mut self, command: Command, args: &[u16]) -> Result<(), Error<E>> {
        let (code, delay, _) = command.as_tuple();
        if !command.allowed(self.is_running) {
            warn!(
                "sen6x: {:?} not allowed while {}",
                command,
                if self.is_running { "measuring" } else { "idle" }
            );
            return Err(Error::NotAllowed);
        }
        debug!("sen6x: command 0x{:04X} ({} args)", code, args.len());
        if args.is_empty() {
            i2c::write_command_u16(&mut self.i2c, self.address, code).map_err(Error::I2c)?;
        } else {
            debug_assert!(args.len() <= MAX_ARGS, "too many arguments for {:?}", command);
            let mut buffer = [0u8; 2 + MAX_ARGS * 3];
            buffer[..2].copy_from_slice(&code.to_be_bytes());
            for (chunk, arg) in buffer[2..].chunks_exact_mut(3).zip(args) {
                chunk.copy_from_slice(&word_with_crc(*arg));
            }
            let len = 2 + args.len().min(MAX_ARGS) * 3;
            self.i2c
                .write(self.address, &buffer[..len])
                .map_err(Error::I2c)?;
        }
        self.delay.delay_ms(delay);
        Ok(())
    }

    /// Command for reading values from the sensor
    fn delayed_read_cmd(&mut self, cmd: Command, data: &mut [u8]) -> Result<(), Error<E>> {
        self.write_command(cmd)?;
        i2c::read_words_with_crc(&mut self.i2c, self.address, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Fault;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = SEN6X_I2C_ADDRESS;

    fn words(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| word_with_crc(*w)).collect()
    }

    fn write(command: Command) -> Transaction {
        Transaction::write(ADDR, command.code().to_be_bytes().to_vec())
    }

    fn write_args(command: Command, args: &[u16]) -> Transaction {
        let mut bytes = command.code().to_be_bytes().to_vec();
        bytes.extend(words(args));
        Transaction::write(ADDR, bytes)
    }

    fn read(data: &[u16]) -> Transaction {
        Transaction::read(ADDR, words(data))
    }

    fn status(status: u32) -> [Transaction; 2] {
        [
            write(Command::ReadDeviceStatus),
            read(&[(status >> 16) as u16, status as u16]),
        ]
    }

    const SAMPLE: [u16; 9] = [12, 35, 40, 41, 4523, 5000, 1000, 10, 612];

    fn running(expectations: &[Transaction]) -> Sen6x<I2cMock, NoopDelay> {
        let mut all = vec![write(Command::StartMeasurement)];
        all.extend_from_slice(expectations);
        let mut sensor = Sen6x::new(I2cMock::new(&all), NoopDelay::new());
        sensor.start_measurement().unwrap();
        sensor
    }

    fn done(sensor: Sen6x<I2cMock, NoopDelay>) {
        let (mut mock, _) = sensor.release();
        mock.done();
    }

    #[test]
    fn product_name_and_serial() {
        let mut name = vec![
            u16::from_be_bytes(*b"SE"),
            u16::from_be_bytes(*b"N6"),
            u16::from_be_bytes(*b"6\0"),
        ];
        name.resize(16, 0);
        let mut serial = vec![u16::from_be_bytes(*b"AB"), u16::from_be_bytes(*b"12")];
        serial.resize(16, 0);
        let expectations = [
            write(Command::GetProductName),
            read(&name),
            write(Command::GetSerialNumber),
            read(&serial),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        assert_eq!(sensor.product_name().unwrap().as_str(), "SEN66");
        assert_eq!(sensor.serial_number().unwrap().as_str(), "AB12");
        done(sensor);
    }

    #[test]
    fn crc_error() {
        let expectations = [
            write(Command::GetVersion),
            Transaction::read(ADDR, vec![0x01, 0x02, 0x00]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        assert_eq!(sensor.version(), Err(Error::Crc));
        done(sensor);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut sensor = running(&[]);
        assert!(sensor.is_running());
        assert_eq!(sensor.start_measurement(), Err(Error::NotAllowed));
        done(sensor);
    }

    #[test]
    fn reads_require_measurement() {
        let mut sensor = Sen6x::new(I2cMock::new(&[]), NoopDelay::new());
        assert_eq!(sensor.data_ready(), Err(Error::NotAllowed));
        assert_eq!(sensor.read_measurement(), Err(Error::NotAllowed));
        assert_eq!(sensor.read_number_concentration(), Err(Error::NotAllowed));
        done(sensor);
    }

    #[test]
    fn data_ready_clears_after_read() {
        let mut expectations = vec![write(Command::GetDataReady), read(&[0x0001])];
        expectations.extend(status(0));
        expectations.extend([
            write(Command::ReadMeasuredValues),
            read(&SAMPLE),
            write(Command::GetDataReady),
            read(&[0x0000]),
        ]);
        let mut sensor = running(&expectations);
        assert!(sensor.data_ready().unwrap());
        sensor.check_sensor_errors().unwrap();
        let data = sensor.read_measurement().unwrap();
        assert_eq!(data.temperature, Some(25.0));
        assert_eq!(data.co2, Some(612));
        assert!(!sensor.data_ready().unwrap());
        done(sensor);
    }

    #[test]
    fn read_without_check_checks_status() {
        let mut expectations = status(0).to_vec();
        expectations.extend([write(Command::ReadMeasuredValues), read(&SAMPLE)]);
        // the clean check is consumed by the first read
        expectations.extend(status(0));
        expectations.extend([write(Command::ReadMeasuredValues), read(&SAMPLE)]);
        let mut sensor = running(&expectations);
        assert_eq!(sensor.read_measurement().unwrap().pm2_5, Some(3.5));
        assert_eq!(sensor.read_measurement().unwrap().pm2_5, Some(3.5));
        done(sensor);
    }

    #[test]
    fn new_sample_invalidates_earlier_check() {
        let faulty = Fault::Co2Sensor.mask();
        let mut expectations = status(0).to_vec();
        expectations.extend([write(Command::GetDataReady), read(&[0x0001])]);
        // the fault appeared after the first check; the read must see it
        expectations.extend(status(faulty));
        let mut sensor = running(&expectations);
        sensor.check_sensor_errors().unwrap();
        assert!(sensor.data_ready().unwrap());
        assert_eq!(
            sensor.read_measurement(),
            Err(Error::DeviceFault(DeviceStatus(faulty)))
        );
        done(sensor);
    }

    #[test]
    fn pending_sample_keeps_the_check() {
        let mut expectations = status(0).to_vec();
        expectations.extend([
            write(Command::GetDataReady),
            read(&[0x0000]),
            write(Command::ReadMeasuredValues),
            read(&SAMPLE),
        ]);
        let mut sensor = running(&expectations);
        sensor.check_sensor_errors().unwrap();
        assert!(!sensor.data_ready().unwrap());
        assert!(sensor.read_measurement().is_ok());
        done(sensor);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "too many arguments")]
    fn too_many_arguments_panic_in_debug() {
        // never dropped: the panic leaves the mock without `done()`
        let mut sensor =
            core::mem::ManuallyDrop::new(Sen6x::new(I2cMock::new(&[]), NoopDelay::new()));
        let args = [0u16; MAX_ARGS + 1];
        let _ = sensor.write_command_with_args(Command::SetVocAlgorithmTuning, &args);
    }

    #[test]
    fn faulted_sample_is_not_read() {
        let faulty = Fault::GasSensor.mask() | Fault::Fan.mask();
        let mut expectations = status(faulty).to_vec();
        expectations.extend(status(faulty));
        let mut sensor = running(&expectations);
        assert_eq!(
            sensor.check_sensor_errors(),
            Err(Error::DeviceFault(DeviceStatus(faulty)))
        );
        assert_eq!(
            sensor.read_measurement(),
            Err(Error::DeviceFault(DeviceStatus(faulty)))
        );
        done(sensor);
    }

    #[test]
    fn speed_warning_does_not_fail() {
        let mut expectations = status(Fault::FanSpeedWarning.mask()).to_vec();
        expectations.extend([write(Command::ReadMeasuredValues), read(&SAMPLE)]);
        let mut sensor = running(&expectations);
        sensor.check_sensor_errors().unwrap();
        assert!(sensor.read_measurement().is_ok());
        done(sensor);
    }

    #[test]
    fn error_descriptions_are_read_fresh() {
        let mut expectations = status(Fault::RhtSensor.mask() | Fault::Co2Sensor.mask()).to_vec();
        expectations.extend(status(0));
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        let names: Vec<_> = sensor
            .error_status_description()
            .unwrap()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["co2_sensor_error", "rht_sensor_error"]);
        assert_eq!(sensor.error_status_description().unwrap().count(), 0);
        done(sensor);
    }

    #[test]
    fn clear_device_status() {
        let expectations = [
            write(Command::ReadAndClearDeviceStatus),
            read(&[0x0000, 0x0010]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        assert_eq!(
            sensor.clear_device_status().unwrap(),
            DeviceStatus(Fault::Fan.mask())
        );
        done(sensor);
    }

    #[test]
    fn number_concentration() {
        let expectations = [
            write(Command::ReadNumberConcentration),
            read(&[100, 120, 125, 126, 0xFFFF]),
        ];
        let mut sensor = running(&expectations);
        let nc = sensor.read_number_concentration().unwrap();
        assert_eq!(nc.nc_pm0_5, Some(10.0));
        assert_eq!(nc.nc_pm4_0, Some(12.6));
        assert_eq!(nc.nc_pm10_0, None);
        done(sensor);
    }

    #[test]
    fn temperature_offset() {
        let expectations = [write_args(
            Command::SetTemperatureOffset,
            &[(-400i16) as u16, 0, 0, 0],
        )];
        let mut sensor = running(&expectations);
        sensor
            .set_temperature_offset(TemperatureOffset::new(-2.0, 0))
            .unwrap();
        assert_eq!(
            sensor.set_temperature_offset(TemperatureOffset::new(-2.0, 7)),
            Err(Error::InvalidInput("temperature offset slot"))
        );
        done(sensor);
    }

    #[test]
    fn voc_tuning_is_idle_only() {
        let tuning = AlgorithmTuning::voc_default();
        let expectations = [
            write_args(Command::SetVocAlgorithmTuning, &[100, 12, 12, 180, 50, 230]),
            write(Command::GetVocAlgorithmTuning),
            read(&[100, 12, 12, 180, 50, 230]),
            write(Command::StartMeasurement),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor.set_voc_algorithm_tuning(tuning).unwrap();
        assert_eq!(sensor.voc_algorithm_tuning().unwrap(), tuning);
        sensor.start_measurement().unwrap();
        assert_eq!(
            sensor.set_voc_algorithm_tuning(tuning),
            Err(Error::NotAllowed)
        );
        done(sensor);
    }

    #[test]
    fn out_of_range_setters_do_not_touch_the_bus() {
        let mut sensor = Sen6x::new(I2cMock::new(&[]), NoopDelay::new());
        assert_eq!(
            sensor.set_ambient_pressure(600),
            Err(Error::InvalidInput("ambient pressure"))
        );
        assert_eq!(
            sensor.set_sensor_altitude(3001),
            Err(Error::InvalidInput("sensor altitude"))
        );
        assert!(matches!(
            sensor.set_nox_algorithm_tuning(AlgorithmTuning::voc_default().with_index_offset(0)),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(sensor.pressure_compensation(), None);
        done(sensor);
    }

    #[test]
    fn ambient_pressure_overrides_altitude() {
        let expectations = [
            write_args(Command::SetAmbientPressure, &[1020]),
            write_args(Command::SetSensorAltitude, &[500]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor.set_ambient_pressure(1020).unwrap();
        sensor.set_sensor_altitude(500).unwrap();
        assert_eq!(
            sensor.pressure_compensation(),
            Some(PressureCompensation::AmbientPressure(1020))
        );
        done(sensor);
    }

    #[test]
    fn altitude_then_pressure() {
        let expectations = [
            write_args(Command::SetSensorAltitude, &[500]),
            write_args(Command::SetAmbientPressure, &[1020]),
            write(Command::DeviceReset),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor.set_sensor_altitude(500).unwrap();
        assert_eq!(
            sensor.pressure_compensation(),
            Some(PressureCompensation::Altitude(500))
        );
        sensor.set_ambient_pressure(1020).unwrap();
        assert_eq!(
            sensor.pressure_compensation(),
            Some(PressureCompensation::AmbientPressure(1020))
        );
        sensor.device_reset().unwrap();
        assert_eq!(sensor.pressure_compensation(), None);
        done(sensor);
    }

    #[test]
    fn pressure_can_be_set_while_measuring() {
        let expectations = [
            write_args(Command::SetAmbientPressure, &[1013]),
            write(Command::GetAmbientPressure),
            read(&[1013]),
        ];
        let mut sensor = running(&expectations);
        sensor.set_ambient_pressure(1013).unwrap();
        assert_eq!(sensor.ambient_pressure().unwrap(), 1013);
        assert_eq!(sensor.set_sensor_altitude(100), Err(Error::NotAllowed));
        done(sensor);
    }

    #[test]
    fn automatic_self_calibration() {
        let expectations = [
            write_args(Command::SetCo2AutomaticSelfCalibration, &[0]),
            write(Command::GetCo2AutomaticSelfCalibration),
            read(&[0]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor.set_co2_automatic_self_calibration(false).unwrap();
        assert!(!sensor.co2_automatic_self_calibration().unwrap());
        done(sensor);
    }

    #[test]
    fn forced_recalibration() {
        let expectations = [
            write_args(Command::PerformForcedCo2Recalibration, &[450]),
            read(&[0x8000 - 25]),
            write_args(Command::PerformForcedCo2Recalibration, &[450]),
            read(&[0xFFFF]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        assert_eq!(sensor.perform_forced_co2_recalibration(450), Ok(-25));
        assert_eq!(
            sensor.perform_forced_co2_recalibration(450),
            Err(Error::RecalibrationFailed)
        );
        done(sensor);
    }

    #[test]
    fn idle_maintenance_commands() {
        let expectations = [
            write(Command::StartFanCleaning),
            write(Command::ActivateShtHeater),
            write_args(Command::SetTemperatureAcceleration, &[10, 20, 5, 0]),
            write(Command::StartMeasurement),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor.start_fan_cleaning().unwrap();
        sensor.activate_sht_heater().unwrap();
        sensor
            .set_temperature_acceleration(TemperatureAcceleration {
                k: 1.0,
                p: 2.0,
                t1: 0.5,
                t2: 0.0,
            })
            .unwrap();
        sensor.start_measurement().unwrap();
        assert_eq!(sensor.start_fan_cleaning(), Err(Error::NotAllowed));
        assert_eq!(sensor.activate_sht_heater(), Err(Error::NotAllowed));
        done(sensor);
    }

    #[test]
    fn raw_values_and_nox_tuning() {
        let expectations = [
            write_args(Command::SetNoxAlgorithmTuning, &[1, 12, 12, 720, 50, 230]),
            write(Command::StartMeasurement),
            write(Command::ReadMeasuredRawValues),
            read(&[5000, 5000, 30000, 16000, 0xFFFF]),
        ];
        let mut sensor = Sen6x::new(I2cMock::new(&expectations), NoopDelay::new());
        sensor
            .set_nox_algorithm_tuning(AlgorithmTuning::nox_default())
            .unwrap();
        sensor.start_measurement().unwrap();
        let raw = sensor.read_raw_values().unwrap();
        assert_eq!(raw.temperature, Some(25.0));
        assert_eq!(raw.nox_ticks, Some(16000));
        assert_eq!(raw.co2, None);
        done(sensor);
    }

    #[test]
    fn voc_state_read_while_measuring_restored_while_idle() {
        let state = [0x0102, 0x0304, 0x0506, 0x0708];
        let expectations = [
            write(Command::GetVocAlgorithmState),
            read(&state),
            write(Command::StopMeasurement),
            write_args(Command::SetVocAlgorithmState, &state),
        ];
        let mut sensor = running(&expectations);
        let saved = sensor.voc_algorithm_state().unwrap();
        assert_eq!(sensor.set_voc_algorithm_state(saved), Err(Error::NotAllowed));
        sensor.stop_measurement().unwrap();
        sensor.set_voc_algorithm_state(saved).unwrap();
        done(sensor);
    }
}
