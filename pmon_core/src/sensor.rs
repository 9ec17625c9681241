//! Sensor bring-up and reads, both retried with the shared policy.

use std::sync::Arc;

use pmon_traits::{Clock, ParticleSensor, SensorBus};

use crate::capabilities::PresentationSink;
use crate::error::{MonitorError, Result};
use crate::hw_error::map_hw_error;
use crate::model::{Measurement, Stage};
use crate::retry::{RetryPolicy, retry};

/// Initialized sensor, returned by [`SensorSource::initialize`].
pub struct SensorHandle {
    sensor: Box<dyn ParticleSensor>,
}

impl core::fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorHandle").finish_non_exhaustive()
    }
}

pub struct SensorSource {
    bus: Box<dyn SensorBus>,
    clock: Arc<dyn Clock + Send + Sync>,
    policy: RetryPolicy,
}

impl SensorSource {
    pub fn new(
        bus: Box<dyn SensorBus>,
        clock: Arc<dyn Clock + Send + Sync>,
        policy: RetryPolicy,
    ) -> Self {
        Self { bus, clock, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Bring the sensor up, retrying until it answers.
    ///
    /// Each failure is logged and shown as "Sensor init failed, retrying".
    pub fn initialize(&mut self, display: &mut dyn PresentationSink) -> Result<SensorHandle> {
        let bus = &mut self.bus;
        let sensor = retry(
            &*self.clock,
            &self.policy,
            || bus.initialize(),
            |e, attempt| {
                let fault = MonitorError::SensorUnavailable(map_hw_error(&**e));
                tracing::warn!(error = %fault, attempt, "unable to initialize sensor, retrying");
                display.show_retrying(Stage::SensorInit);
            },
        )
        .map_err(|x| MonitorError::RetriesExhausted {
            stage: Stage::SensorInit,
            attempts: x.attempts,
        })?;
        tracing::info!("initialized particulate sensor");
        Ok(SensorHandle { sensor })
    }

    /// Read one measurement, retrying until the sensor answers.
    ///
    /// Never fails under an unbounded policy.
    pub fn read_with_retry(
        &self,
        handle: &mut SensorHandle,
        display: &mut dyn PresentationSink,
    ) -> Result<Measurement> {
        let sensor = &mut handle.sensor;
        let reading = retry(
            &*self.clock,
            &self.policy,
            || sensor.read(),
            |e, attempt| {
                let fault = MonitorError::SensorRead(map_hw_error(&**e));
                tracing::warn!(error = %fault, attempt, "unable to read sensor, retrying");
                display.show_retrying(Stage::SensorReading);
            },
        )
        .map_err(|x| MonitorError::RetriesExhausted {
            stage: Stage::SensorReading,
            attempts: x.attempts,
        })?;
        let m = Measurement::from_reading(reading, self.clock.now());
        tracing::debug!(
            pm1_0 = m.pm10_standard,
            pm2_5 = m.pm25_standard,
            pm10 = m.pm100_standard,
            "sensor sample"
        );
        Ok(m)
    }
}
