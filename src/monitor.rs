//! Polling loop around a [`Sen6x`] that persists the VOC algorithm state.
//!
//! One call to [`Monitor::poll`] is one cycle: check data readiness, check the device status,
//! read the sample and, on a fixed interval, hand the VOC algorithm state to a [`StateStore`].
//! Device faults are reported and the loop goes on; any other error is returned.

use crate::error::Error;
use crate::sen6x::Sen6x;
use crate::status::DeviceStatus;
use crate::types::{Sen6xData, VocAlgorithmState};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

/// Monotonic time source.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&mut self) -> u64;
}

/// Non-volatile storage for the VOC algorithm state.
pub trait StateStore {
    type Error;

    fn load(&mut self) -> Result<Option<VocAlgorithmState>, Self::Error>;

    fn save(&mut self, state: &VocAlgorithmState) -> Result<(), Self::Error>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Minimum time between two saves of the VOC algorithm state.
    pub save_interval_ms: u64,
    /// Read-and-clear the device status after reporting a fault.
    pub clear_faults: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            save_interval_ms: 60_000,
            clear_faults: false,
        }
    }
}

/// Outcome of one polling cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Poll {
    /// No new sample yet.
    Pending,
    /// A new sample was read.
    Sample {
        data: Sen6xData,
        /// The VOC algorithm state was saved during this cycle. A failed save leaves this
        /// `false` and is available from [`Monitor::take_save_error`].
        state_saved: bool,
    },
    /// The device reported a fault; the sample was not read.
    Fault(DeviceStatus),
}

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum MonitorError<E, SE> {
    #[cfg_attr(feature = "thiserror", error("sensor: {0}"))]
    Sensor(Error<E>),
    #[cfg_attr(feature = "thiserror", error("state store: {0:?}"))]
    Store(SE),
}

impl<E, SE> From<Error<E>> for MonitorError<E, SE> {
    fn from(err: Error<E>) -> Self {
        MonitorError::Sensor(err)
    }
}

pub struct Monitor<I2C: I2c, D, C, S: StateStore> {
    sensor: Sen6x<I2C, D>,
    clock: C,
    store: S,
    config: MonitorConfig,
    last_save_ms: u64,
    save_error: Option<MonitorError<I2C::Error, S::Error>>,
}

impl<I2C, D, E, C, S> Monitor<I2C, D, C, S>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
    C: Clock,
    S: StateStore,
{
    pub fn new(sensor: Sen6x<I2C, D>, clock: C, store: S, config: MonitorConfig) -> Self {
        Monitor {
            sensor,
            clock,
            store,
            config,
            last_save_ms: 0,
            save_error: None,
        }
    }

    /// Restores a stored VOC algorithm state, if any, and starts measurement.
    ///
    /// Returns whether a state was restored. The sensor must be idle.
    pub fn start(&mut self) -> Result<bool, MonitorError<E, S::Error>> {
        let restored = match self.store.load().map_err(MonitorError::Store)? {
            Some(state) => {
                self.sensor.set_voc_algorithm_state(state)?;
                info!("sen6x: VOC algorithm state restored");
                true
            }
            None => false,
        };
        self.sensor.start_measurement()?;
        self.last_save_ms = self.clock.now_ms();
        Ok(restored)
    }

    /// Runs one polling cycle.
    pub fn poll(&mut self) -> Result<Poll, MonitorError<E, S::Error>> {
        if !self.sensor.data_ready()? {
            return Ok(Poll::Pending);
        }
        match self.sensor.check_sensor_errors() {
            Ok(()) => {}
            Err(Error::DeviceFault(status)) => {
                for (name, description) in status.descriptions() {
                    warn!("sen6x: {}: {}", name, description);
                }
                if self.config.clear_faults {
                    self.sensor.clear_device_status()?;
                }
                return Ok(Poll::Fault(status));
            }
            Err(e) => return Err(e.into()),
        }
        let data = self.sensor.read_measurement()?;

        let now = self.clock.now_ms();
        let mut state_saved = false;
        if now.saturating_sub(self.last_save_ms) > self.config.save_interval_ms {
            // the next attempt waits a full interval, whether this one succeeds or not
            self.last_save_ms = now;
            match self.save_state() {
                Ok(()) => state_saved = true,
                Err(e) => {
                    warn!("sen6x: saving VOC algorithm state failed");
                    self.save_error = Some(e);
                }
            }
        }
        Ok(Poll::Sample { data, state_saved })
    }

    /// The error of the last failed periodic state save, if any. Cleared by this call.
    pub fn take_save_error(&mut self) -> Option<MonitorError<E, S::Error>> {
        self.save_error.take()
    }

    /// Saves the VOC algorithm state one last time and stops measurement.
    pub fn stop(&mut self) -> Result<(), MonitorError<E, S::Error>> {
        self.save_state()?;
        self.sensor.stop_measurement()?;
        Ok(())
    }

    pub fn sensor(&mut self) -> &mut Sen6x<I2C, D> {
        &mut self.sensor
    }

    pub fn release(self) -> (Sen6x<I2C, D>, C, S) {
        (self.sensor, self.clock, self.store)
    }

    fn save_state(&mut self) -> Result<(), MonitorError<E, S::Error>> {
        let state = self.sensor.voc_algorithm_state()?;
        self.store.save(&state).map_err(MonitorError::Store)?;
        info!("sen6x: VOC algorithm state saved");
        Ok(())
    }
}
