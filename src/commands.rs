/// Measurement state a command may be issued in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Allowed {
    Idle,
    Measuring,
    Any,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    StartMeasurement,
    StopMeasurement,
    GetDataReady,
    ReadMeasuredValues,
    ReadNumberConcentration,
    ReadMeasuredRawValues,
    StartFanCleaning,
    SetTemperatureOffset,
    GetVocAlgorithmTuning,
    SetVocAlgorithmTuning,
    GetNoxAlgorithmTuning,
    SetNoxAlgorithmTuning,
    SetTemperatureAcceleration,
    GetVocAlgorithmState,
    SetVocAlgorithmState,
    PerformForcedCo2Recalibration,
    GetCo2AutomaticSelfCalibration,
    SetCo2AutomaticSelfCalibration,
    GetAmbientPressure,
    SetAmbientPressure,
    GetSensorAltitude,
    SetSensorAltitude,
    ActivateShtHeater,
    GetProductName,
    GetSerialNumber,
    GetVersion,
    ReadDeviceStatus,
    ReadAndClearDeviceStatus,
    DeviceReset,
}

impl Command {
    /// Command code, execution time in ms and the state it may be sent in.
    pub(crate) fn as_tuple(self) -> (u16, u32, Allowed) {
        match self {
            Self::StartMeasurement => (0x0021, 50, Allowed::Idle),
            Self::StopMeasurement => (0x0104, 1000, Allowed::Any),
            Self::GetDataReady => (0x0202, 20, Allowed::Measuring),
            Self::ReadMeasuredValues => (0x0300, 20, Allowed::Measuring),
            Self::ReadNumberConcentration => (0x0316, 20, Allowed::Measuring),
            Self::ReadMeasuredRawValues => (0x0405, 20, Allowed::Measuring),
            Self::StartFanCleaning => (0x5607, 20, Allowed::Idle),
            Self::SetTemperatureOffset => (0x60B2, 20, Allowed::Any),
            Self::GetVocAlgorithmTuning | Self::SetVocAlgorithmTuning => {
                (0x60D0, 20, Allowed::Idle)
            }
            Self::GetNoxAlgorithmTuning | Self::SetNoxAlgorithmTuning => {
                (0x60E1, 20, Allowed::Idle)
            }
            Self::SetTemperatureAcceleration => (0x6100, 20, Allowed::Idle),
            Self::GetVocAlgorithmState => (0x6181, 20, Allowed::Any),
            Self::SetVocAlgorithmState => (0x6181, 20, Allowed::Idle),
            Self::PerformForcedCo2Recalibration => (0x6707, 500, Allowed::Idle),
            Self::GetCo2AutomaticSelfCalibration | Self::SetCo2AutomaticSelfCalibration => {
                (0x6711, 20, Allowed::Idle)
            }
            Self::GetAmbientPressure | Self::SetAmbientPressure => (0x6720, 20, Allowed::Any),
            Self::GetSensorAltitude | Self::SetSensorAltitude => (0x6736, 20, Allowed::Idle),
            Self::ActivateShtHeater => (0x6765, 1300, Allowed::Idle),
            Self::GetProductName => (0xD014, 20, Allowed::Any),
            Self::GetSerialNumber => (0xD033, 20, Allowed::Any),
            Self::GetVersion => (0xD100, 20, Allowed::Any),
            Self::ReadDeviceStatus => (0xD206, 20, Allowed::Any),
            Self::ReadAndClearDeviceStatus => (0xD210, 20, Allowed::Any),
            Self::DeviceReset => (0xD304, 1200, Allowed::Any),
        }
    }

    pub(crate) fn code(self) -> u16 {
        self.as_tuple().0
    }

    pub(crate) fn allowed(self, is_running: bool) -> bool {
        match self.as_tuple().2 {
            Allowed::Any => true,
            Allowed::Idle => !is_running,
            Allowed::Measuring => is_running,
        }
    }
}
