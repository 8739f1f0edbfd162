use core::fmt;

/// Unsigned words read as `0xFFFF` are unknown (sensor still initializing).
const UNKNOWN_U16: u16 = 0xFFFF;
/// Signed words read as `0x7FFF` are unknown (sensor still initializing).
const UNKNOWN_I16: i16 = 0x7FFF;

/// Word `index` of a CRC-interleaved response buffer.
pub(crate) fn word(data: &[u8], index: usize) -> u16 {
    u16::from_be_bytes([data[index * 3], data[index * 3 + 1]])
}

fn scaled_u16(raw: u16, scale: f32) -> Option<f32> {
    (raw != UNKNOWN_U16).then(|| raw as f32 / scale)
}

fn scaled_i16(raw: i16, scale: f32) -> Option<f32> {
    (raw != UNKNOWN_I16).then(|| raw as f32 / scale)
}

/// Converts a physical value to sensor ticks, rounding half away from zero.
fn to_ticks(
    value: f32,
    scale: f32,
    min: f32,
    max: f32,
    what: &'static str,
) -> Result<i32, &'static str> {
    if !value.is_finite() || value < min || value > max {
        return Err(what);
    }
    let scaled = value * scale;
    let rounded = if scaled >= 0.0 { scaled + 0.5 } else { scaled - 0.5 };
    Ok(rounded as i32)
}

/// SEN6x sensor data.
///
/// A value is `None` while the corresponding sensor is still in its warm-up period.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Sen6xData {
    /// Mass Concentration PM1.0 [μg/m³]
    pub pm1_0: Option<f32>,
    /// Mass Concentration PM2.5 [μg/m³]
    pub pm2_5: Option<f32>,
    /// Mass Concentration PM4.0 [μg/m³]
    pub pm4_0: Option<f32>,
    /// Mass Concentration PM10 [μg/m³]
    pub pm10_0: Option<f32>,
    /// Compensated Ambient Humidity [%RH]
    pub humidity: Option<f32>,
    /// Compensated Ambient Temperature [°C]
    pub temperature: Option<f32>,
    /// VOC Index
    pub voc_index: Option<f32>,
    /// NOx Index
    pub nox_index: Option<f32>,
    /// CO2 concentration [ppm]
    pub co2: Option<u16>,
}

/// SEN6x sensor raw data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sen6xDataRaw {
    /// Mass Concentration PM1.0 [μg/m³] [×10]
    pub pm1_0: u16,
    /// Mass Concentration PM2.5 [μg/m³] [×10]
    pub pm2_5: u16,
    /// Mass Concentration PM4.0 [μg/m³] [×10]
    pub pm4_0: u16,
    /// Mass Concentration PM10.0 [μg/m³] [×10]
    pub pm10_0: u16,
    /// Compensated Ambient Humidity [%RH] [×100]
    pub humidity: i16,
    /// Compensated Ambient Temperature [°C] [×200]
    pub temperature: i16,
    /// VOC Index [×10]
    pub voc_index: i16,
    /// NOx Index [×10]
    pub nox_index: i16,
    /// CO2 concentration [ppm]
    pub co2: u16,
}

impl Sen6xDataRaw {
    pub(crate) fn from_words(data: &[u8; 27]) -> Self {
        Sen6xDataRaw {
            pm1_0: word(data, 0),
            pm2_5: word(data, 1),
            pm4_0: word(data, 2),
            pm10_0: word(data, 3),
            humidity: word(data, 4) as i16,
            temperature: word(data, 5) as i16,
            voc_index: word(data, 6) as i16,
            nox_index: word(data, 7) as i16,
            co2: word(data, 8),
        }
    }
}

impl From<Sen6xDataRaw> for Sen6xData {
    fn from(raw: Sen6xDataRaw) -> Self {
        Sen6xData {
            pm1_0: scaled_u16(raw.pm1_0, 10.),
            pm2_5: scaled_u16(raw.pm2_5, 10.),
            pm4_0: scaled_u16(raw.pm4_0, 10.),
            pm10_0: scaled_u16(raw.pm10_0, 10.),
            humidity: scaled_i16(raw.humidity, 100.),
            temperature: scaled_i16(raw.temperature, 200.),
            voc_index: scaled_i16(raw.voc_index, 10.),
            nox_index: scaled_i16(raw.nox_index, 10.),
            co2: (raw.co2 != UNKNOWN_U16).then_some(raw.co2),
        }
    }
}

/// Particle number concentrations [#/cm³].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct NumberConcentration {
    /// Number Concentration PM0.5 [#/cm³]
    pub nc_pm0_5: Option<f32>,
    /// Number Concentration PM1.0 [#/cm³]
    pub nc_pm1_0: Option<f32>,
    /// Number Concentration PM2.5 [#/cm³]
    pub nc_pm2_5: Option<f32>,
    /// Number Concentration PM4.0 [#/cm³]
    pub nc_pm4_0: Option<f32>,
    /// Number Concentration PM10.0 [#/cm³]
    pub nc_pm10_0: Option<f32>,
}

impl NumberConcentration {
    pub(crate) fn from_words(data: &[u8; 15]) -> Self {
        NumberConcentration {
            nc_pm0_5: scaled_u16(word(data, 0), 10.),
            nc_pm1_0: scaled_u16(word(data, 1), 10.),
            nc_pm2_5: scaled_u16(word(data, 2), 10.),
            nc_pm4_0: scaled_u16(word(data, 3), 10.),
            nc_pm10_0: scaled_u16(word(data, 4), 10.),
        }
    }
}

/// Raw sensor signals, before compensation and index algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RawValues {
    /// Raw humidity [%RH]
    pub humidity: Option<f32>,
    /// Raw temperature [°C]
    pub temperature: Option<f32>,
    /// VOC sensor ticks (SRAW_VOC)
    pub voc_ticks: Option<u16>,
    /// NOx sensor ticks (SRAW_NOX)
    pub nox_ticks: Option<u16>,
    /// Uninterpolated CO2 [ppm]
    pub co2: Option<u16>,
}

impl RawValues {
    pub(crate) fn from_words(data: &[u8; 15]) -> Self {
        let present = |raw: u16| (raw != UNKNOWN_U16).then_some(raw);
        RawValues {
            humidity: scaled_i16(word(data, 0) as i16, 100.),
            temperature: scaled_i16(word(data, 1) as i16, 200.),
            voc_ticks: present(word(data, 2)),
            nox_ticks: present(word(data, 3)),
            co2: present(word(data, 4)),
        }
    }
}

/// Opaque VOC algorithm state.
///
/// Read it periodically while measuring and store it in non-volatile memory; writing it back
/// before starting measurement skips the learning phase after a power cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VocAlgorithmState([u8; 8]);

impl VocAlgorithmState {
    pub const SIZE: usize = 8;

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        VocAlgorithmState(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub(crate) fn from_words(data: &[u8; 12]) -> Self {
        let mut bytes = [0; 8];
        for (i, chunk) in bytes.chunks_exact_mut(2).enumerate() {
            chunk.copy_from_slice(&word(data, i).to_be_bytes());
        }
        VocAlgorithmState(bytes)
    }

    pub(crate) fn to_words(self) -> [u16; 4] {
        let mut words = [0; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        words
    }
}

/// Temperature offset compensation for one of the five slots.
///
/// The applied offset is `offset + slope * T`, low-pass filtered with `time_constant`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TemperatureOffset {
    /// Constant offset [°C]
    pub offset: f32,
    /// Temperature dependent offset factor
    pub slope: f32,
    /// Time constant [s]; 0 applies the offset immediately
    pub time_constant: u16,
    /// Slot `0..=4`
    pub slot: u8,
}

impl TemperatureOffset {
    pub fn new(offset: f32, slot: u8) -> Self {
        TemperatureOffset {
            offset,
            slot,
            ..Default::default()
        }
    }

    pub(crate) fn to_words(self) -> Result<[u16; 4], &'static str> {
        if self.slot > 4 {
            return Err("temperature offset slot");
        }
        let offset = to_ticks(self.offset, 200., -163.84, 163.835, "temperature offset")?;
        let slope = to_ticks(self.slope, 10_000., -3.2768, 3.2767, "temperature slope")?;
        Ok([
            offset as i16 as u16,
            slope as i16 as u16,
            self.time_constant,
            self.slot as u16,
        ])
    }
}

/// Parameters of the humidity/temperature acceleration model.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TemperatureAcceleration {
    /// Filter constant K [×10 on the wire]
    pub k: f32,
    /// Filter constant P [×10 on the wire]
    pub p: f32,
    /// Time constant T1 [s] [×10 on the wire]
    pub t1: f32,
    /// Time constant T2 [s] [×10 on the wire]
    pub t2: f32,
}

impl TemperatureAcceleration {
    pub(crate) fn to_words(self) -> Result<[u16; 4], &'static str> {
        let ticks = |value: f32| {
            to_ticks(value, 10., 0., 6553.5, "temperature acceleration").map(|t| t as u16)
        };
        Ok([ticks(self.k)?, ticks(self.p)?, ticks(self.t1)?, ticks(self.t2)?])
    }
}

/// Tuning parameters of the VOC or NOx index algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlgorithmTuning {
    /// Index representing typical conditions
    pub index_offset: i16,
    /// Time constant of the offset estimation [h]
    pub learning_time_offset_hours: i16,
    /// Time constant of the gain estimation [h]
    pub learning_time_gain_hours: i16,
    /// Maximum duration of gating [min]; 0 disables gating
    pub gating_max_duration_minutes: i16,
    /// Initial estimate of the standard deviation
    pub std_initial: i16,
    /// Gain factor to amplify or attenuate the index output
    pub gain_factor: i16,
}

impl AlgorithmTuning {
    pub const fn voc_default() -> Self {
        AlgorithmTuning {
            index_offset: 100,
            learning_time_offset_hours: 12,
            learning_time_gain_hours: 12,
            gating_max_duration_minutes: 180,
            std_initial: 50,
            gain_factor: 230,
        }
    }

    pub const fn nox_default() -> Self {
        AlgorithmTuning {
            index_offset: 1,
            learning_time_offset_hours: 12,
            learning_time_gain_hours: 12,
            gating_max_duration_minutes: 720,
            std_initial: 50,
            gain_factor: 230,
        }
    }

    pub fn with_index_offset(mut self, index_offset: i16) -> Self {
        self.index_offset = index_offset;
        self
    }

    pub(crate) fn from_words(data: &[u8; 18]) -> Self {
        AlgorithmTuning {
            index_offset: word(data, 0) as i16,
            learning_time_offset_hours: word(data, 1) as i16,
            learning_time_gain_hours: word(data, 2) as i16,
            gating_max_duration_minutes: word(data, 3) as i16,
            std_initial: word(data, 4) as i16,
            gain_factor: word(data, 5) as i16,
        }
    }

    fn check_common(&self) -> Result<(), &'static str> {
        if !(1..=250).contains(&self.index_offset) {
            return Err("index offset");
        }
        if !(1..=1000).contains(&self.learning_time_offset_hours) {
            return Err("learning time offset");
        }
        if !(0..=3000).contains(&self.gating_max_duration_minutes) {
            return Err("gating max duration");
        }
        if !(1..=1000).contains(&self.gain_factor) {
            return Err("gain factor");
        }
        Ok(())
    }

    pub(crate) fn voc_words(self) -> Result<[u16; 6], &'static str> {
        self.check_common()?;
        if !(1..=1000).contains(&self.learning_time_gain_hours) {
            return Err("learning time gain");
        }
        if !(10..=5000).contains(&self.std_initial) {
            return Err("std initial");
        }
        Ok(self.words())
    }

    /// The NOx algorithm has no gain estimation; these two parameters are fixed.
    pub(crate) fn nox_words(self) -> Result<[u16; 6], &'static str> {
        self.check_common()?;
        if self.learning_time_gain_hours != 12 {
            return Err("learning time gain (must be 12 for NOx)");
        }
        if self.std_initial != 50 {
            return Err("std initial (must be 50 for NOx)");
        }
        Ok(self.words())
    }

    fn words(self) -> [u16; 6] {
        [
            self.index_offset as u16,
            self.learning_time_offset_hours as u16,
            self.learning_time_gain_hours as u16,
            self.gating_max_duration_minutes as u16,
            self.std_initial as u16,
            self.gain_factor as u16,
        ]
    }
}

impl Default for AlgorithmTuning {
    fn default() -> Self {
        Self::voc_default()
    }
}

/// Source of the pressure used for CO2 compensation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PressureCompensation {
    /// Derived from the sensor altitude [m]
    Altitude(u16),
    /// Ambient pressure [hPa]; overrides any altitude
    AmbientPressure(u16),
}

/// Product name or serial number, up to 32 ASCII characters.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DeviceString {
    bytes: [u8; 32],
    len: usize,
}

impl DeviceString {
    /// Strips CRC bytes and stops at the first NUL.
    pub(crate) fn from_words(data: &[u8; 48]) -> Option<Self> {
        let mut bytes = [0; 32];
        let mut len = 0;
        for chunk in data.chunks_exact(3) {
            for byte in &chunk[..2] {
                if *byte == 0 {
                    return Self::checked(bytes, len);
                }
                bytes[len] = *byte;
                len += 1;
            }
        }
        Self::checked(bytes, len)
    }

    fn checked(bytes: [u8; 32], len: usize) -> Option<Self> {
        core::str::from_utf8(&bytes[..len]).ok()?;
        Some(DeviceString { bytes, len })
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl fmt::Debug for DeviceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for DeviceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Firmware version.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version {
    /// Firmware major version
    pub major: u8,
    /// Firmware minor version
    pub minor: u8,
}
