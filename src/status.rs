//! Device status register decoding.

use core::fmt;

/// A named bit of the device status register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Fan speed is off by more than 10% for multiple measurements. Warning only.
    FanSpeedWarning,
    /// Particulate matter sensor failed.
    PmSensor,
    /// CO2 sensor failed.
    Co2Sensor,
    /// VOC/NOx gas sensor failed.
    GasSensor,
    /// Humidity and temperature sensor failed.
    RhtSensor,
    /// Fan is mechanically blocked or broken.
    Fan,
    /// A bit the SEN66 does not assign. Reported, but neither an error nor a warning.
    Reserved(u8),
}

const RESERVED_NAMES: [&str; 32] = [
    "reserved_bit_0",
    "reserved_bit_1",
    "reserved_bit_2",
    "reserved_bit_3",
    "reserved_bit_4",
    "reserved_bit_5",
    "reserved_bit_6",
    "reserved_bit_7",
    "reserved_bit_8",
    "reserved_bit_9",
    "reserved_bit_10",
    "reserved_bit_11",
    "reserved_bit_12",
    "reserved_bit_13",
    "reserved_bit_14",
    "reserved_bit_15",
    "reserved_bit_16",
    "reserved_bit_17",
    "reserved_bit_18",
    "reserved_bit_19",
    "reserved_bit_20",
    "reserved_bit_21",
    "reserved_bit_22",
    "reserved_bit_23",
    "reserved_bit_24",
    "reserved_bit_25",
    "reserved_bit_26",
    "reserved_bit_27",
    "reserved_bit_28",
    "reserved_bit_29",
    "reserved_bit_30",
    "reserved_bit_31",
];

/// All assigned bits, highest bit first.
pub const FAULTS: [Fault; 6] = [
    Fault::FanSpeedWarning,
    Fault::PmSensor,
    Fault::Co2Sensor,
    Fault::GasSensor,
    Fault::RhtSensor,
    Fault::Fan,
];

impl Fault {
    /// The fault for bit `bit` (`0..=31`) of the status register.
    pub fn from_bit(bit: u8) -> Fault {
        FAULTS
            .into_iter()
            .find(|fault| fault.bit() == bit)
            .unwrap_or(Fault::Reserved(bit & 31))
    }

    /// Bit position in the status register.
    pub fn bit(self) -> u8 {
        match self {
            Fault::Reserved(bit) => bit & 31,
            Fault::FanSpeedWarning => 21,
            Fault::PmSensor => 11,
            Fault::Co2Sensor => 9,
            Fault::GasSensor => 7,
            Fault::RhtSensor => 6,
            Fault::Fan => 4,
        }
    }

    pub fn mask(self) -> u32 {
        1 << self.bit()
    }

    /// Warnings do not invalidate a measurement.
    pub fn is_warning(self) -> bool {
        matches!(self, Fault::FanSpeedWarning)
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Fault::FanSpeedWarning | Fault::Reserved(_))
    }

    /// Stable identifier of the fault category.
    pub fn name(self) -> &'static str {
        match self {
            Fault::FanSpeedWarning => "fan_speed_warning",
            Fault::PmSensor => "pm_sensor_error",
            Fault::Co2Sensor => "co2_sensor_error",
            Fault::GasSensor => "gas_sensor_error",
            Fault::RhtSensor => "rht_sensor_error",
            Fault::Fan => "fan_error",
            Fault::Reserved(bit) => RESERVED_NAMES[(bit & 31) as usize],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Fault::FanSpeedWarning => "Fan speed is too high or too low",
            Fault::PmSensor => "PM sensor error: particulate matter values are unreliable",
            Fault::Co2Sensor => "CO2 sensor error: CO2 values are unreliable",
            Fault::GasSensor => "Gas sensor error: VOC and NOx index values are unreliable",
            Fault::RhtSensor => "RH/T sensor error: humidity and temperature values are unreliable",
            Fault::Fan => "Fan error: fan is mechanically blocked or broken",
            Fault::Reserved(_) => "Reserved status bit is set",
        }
    }
}

/// Snapshot of the 32-bit device status register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DeviceStatus(pub u32);

impl DeviceStatus {
    pub(crate) fn from_words(data: &[u8; 6]) -> Self {
        DeviceStatus(u32::from_be_bytes([data[0], data[1], data[3], data[4]]))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_set(self, fault: Fault) -> bool {
        self.0 & fault.mask() != 0
    }

    /// Any error bit set. Warnings and reserved bits are not counted.
    pub fn has_error(self) -> bool {
        self.faults().any(Fault::is_error)
    }

    pub fn has_warning(self) -> bool {
        self.faults().any(Fault::is_warning)
    }

    /// Every set bit, highest bit first.
    pub fn faults(self) -> impl Iterator<Item = Fault> {
        (0..32u8)
            .rev()
            .filter(move |bit| self.0 & (1u32 << *bit) != 0)
            .map(Fault::from_bit)
    }

    /// One `(name, description)` pair per set bit.
    pub fn descriptions(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.faults().map(|fault| (fault.name(), fault.description()))
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status 0x{:08X}", self.0)?;
        if self.0 == 0 {
            return write!(f, " (ok)");
        }
        let mut separator = " (";
        for fault in self.faults() {
            write!(f, "{}{}", separator, fault.name())?;
            separator = ", ";
        }
        if separator == ", " {
            write!(f, ")")?;
        }
        Ok(())
    }
}
