//! Simulated Vitals Backend
//!
//! An in-process `VitalsApi` for running the dashboard without a server. Three
//! simulated devices produce one reading per second, drifting around a
//! per-device baseline. One of them runs close to the default heart rate limit,
//! so alerts can be exercised.
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use log::{error, trace};
use rand::Rng;

use crate::{
    api::controller::VitalsApi,
    components::api_client::readings_within_window,
    core::constants::READING_WINDOW_SECS,
    model::vitals::{now_secs, DeviceId, RawReading},
};

/// Readings kept per device, one window at one reading per second.
const HISTORY_LEN: usize = READING_WINDOW_SECS as usize;

#[derive(Debug)]
struct SimulatedDevice {
    baseline: RawReading,
    history: VecDeque<RawReading>,
}

impl SimulatedDevice {
    fn new(heart_rate: f64, spo2: f64, temperature: f64) -> Self {
        Self {
            baseline: RawReading {
                heart_rate,
                spo2,
                temperature,
                timestamp_secs: 0.0,
            },
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R, timestamp_secs: f64) -> RawReading {
        let previous = self.history.back().unwrap_or(&self.baseline);
        // random walk, pulled back towards the baseline
        let drift = |prev: f64, base: f64, step: f64, rng: &mut R| {
            prev + (base - prev) * 0.1 + rng.gen_range(-step..=step)
        };
        RawReading {
            heart_rate: drift(previous.heart_rate, self.baseline.heart_rate, 4.0, rng).round(),
            spo2: drift(previous.spo2, self.baseline.spo2, 1.0, rng)
                .clamp(80.0, 100.0)
                .round(),
            temperature: (drift(previous.temperature, self.baseline.temperature, 0.1, rng)
                * 10.0)
                .round()
                / 10.0,
            timestamp_secs,
        }
    }

    /// Appends one reading per elapsed second up to `now_secs`.
    fn advance_to<R: Rng>(&mut self, rng: &mut R, now_secs: f64) {
        let oldest = (now_secs - HISTORY_LEN as f64).floor();
        let mut next = self
            .history
            .back()
            .map_or(oldest, |last| (last.timestamp_secs + 1.0).max(oldest));
        while next <= now_secs {
            let reading = self.sample(rng, next);
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(reading);
            next += 1.0;
        }
    }
}

#[derive(Debug)]
pub struct MockVitalsClient {
    order: Vec<DeviceId>,
    devices: Mutex<HashMap<DeviceId, SimulatedDevice>>,
}

impl Default for MockVitalsClient {
    fn default() -> Self {
        let devices = [
            ("arduino_1", SimulatedDevice::new(72.0, 98.0, 36.6)),
            ("arduino_2", SimulatedDevice::new(88.0, 95.0, 37.2)),
            ("arduino_3", SimulatedDevice::new(116.0, 93.0, 38.1)),
        ];
        Self {
            order: devices.iter().map(|(id, _)| DeviceId::new(*id)).collect(),
            devices: Mutex::new(
                devices
                    .into_iter()
                    .map(|(id, device)| (DeviceId::new(id), device))
                    .collect(),
            ),
        }
    }
}

impl MockVitalsClient {
    fn readings_at(&self, device: &DeviceId, now_secs: f64) -> Vec<RawReading> {
        let mut devices = match self.devices.lock() {
            Ok(lck) => lck,
            Err(e) => {
                error!("simulated device state poisoned: {}", e);
                return Vec::new();
            }
        };
        let Some(simulated) = devices.get_mut(device) else {
            trace!("unknown simulated device {}", device);
            return Vec::new();
        };
        simulated.advance_to(&mut rand::thread_rng(), now_secs);
        readings_within_window(simulated.history.iter().copied().collect(), now_secs)
    }
}

#[async_trait]
impl VitalsApi for MockVitalsClient {
    async fn list_devices(&self) -> Vec<DeviceId> {
        self.order.clone()
    }

    async fn get_readings(&self, device: &DeviceId) -> Vec<RawReading> {
        self.readings_at(device, now_secs())
    }
}
