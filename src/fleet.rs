//! Fleet generator - synthetic telemetry snapshots

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::models::{DeviceReading, Snapshot};

pub const DEFAULT_DEVICE_COUNT: usize = 5;
pub const MAX_DEVICE_COUNT: usize = 10_000;

const USAGE_RANGE: (f64, f64) = (5.0, 95.0);
const TEMP_RANGE: (f64, f64) = (30.0, 85.0);
const NETWORK_JITTER: f64 = 300_000.0;
const BASE_SENT_BYTES: f64 = 3_440_000.0;
const BASE_RECEIVED_BYTES: f64 = 29_800_000.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FleetError {
    #[error("Device count {requested} exceeds the maximum of {max}")]
    TooManyDevices { requested: usize, max: usize },
}

/// Owns the random source shared by all requests
pub struct FleetGenerator {
    rng: Mutex<StdRng>,
}

impl FleetGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw a fresh snapshot of `count` devices.
    ///
    /// A count of zero yields an empty snapshot. Counts above
    /// [`MAX_DEVICE_COUNT`] are rejected before anything is drawn.
    pub fn generate(&self, count: usize) -> Result<Snapshot, FleetError> {
        if count > MAX_DEVICE_COUNT {
            return Err(FleetError::TooManyDevices {
                requested: count,
                max: MAX_DEVICE_COUNT,
            });
        }

        let devices = {
            let mut rng = self.rng.lock();
            (1..=count)
                .map(|index| draw_reading(&mut *rng, index))
                .collect::<Vec<_>>()
        };
        let timestamp = chrono::Utc::now().timestamp();

        tracing::debug!(
            devices = devices.len(),
            high_load = devices.iter().filter(|d| d.is_high_load()).count(),
            "Generated fleet snapshot"
        );

        Ok(Snapshot { devices, timestamp })
    }
}

impl Default for FleetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_reading<R: Rng + ?Sized>(rng: &mut R, index: usize) -> DeviceReading {
    let cpu = round2(rng.gen_range(USAGE_RANGE.0..=USAGE_RANGE.1));
    let ram = round2(rng.gen_range(USAGE_RANGE.0..=USAGE_RANGE.1));
    let temperature = round2(rng.gen_range(TEMP_RANGE.0..=TEMP_RANGE.1));
    let network_sent = round2(BASE_SENT_BYTES + rng.gen_range(-NETWORK_JITTER..=NETWORK_JITTER));
    let network_received =
        round2(BASE_RECEIVED_BYTES + rng.gen_range(-NETWORK_JITTER..=NETWORK_JITTER));

    DeviceReading::new(index, cpu, ram, temperature, network_sent, network_received)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anomaly, DeviceStatus, DeviceType};
    use tokio_test::{assert_err, assert_ok};

    fn assert_in(value: f64, lo: f64, hi: f64, field: &str) {
        assert!(
            (lo..=hi).contains(&value),
            "{} = {} outside [{}, {}]",
            field,
            value,
            lo,
            hi
        );
    }

    #[test]
    fn test_ranges_hold() {
        let generator = FleetGenerator::seeded(7);
        let snapshot = assert_ok!(generator.generate(2_000));

        for d in &snapshot.devices {
            assert_in(d.cpu, 5.0, 95.0, "cpu");
            assert_in(d.ram, 5.0, 95.0, "ram");
            assert_in(d.temperature, 30.0, 85.0, "temp");
            assert_in(d.network_sent, 3_140_000.0, 3_740_000.0, "network_sent");
            assert_in(d.network_received, 29_500_000.0, 30_100_000.0, "network_received");
        }
    }

    #[test]
    fn test_values_have_two_decimals() {
        let snapshot = FleetGenerator::seeded(11).generate(200).unwrap();
        for d in &snapshot.devices {
            for v in [d.cpu, d.ram, d.temperature, d.network_sent, d.network_received] {
                assert_eq!(round2(v), v);
            }
        }
    }

    #[test]
    fn test_status_matches_predicate() {
        let snapshot = FleetGenerator::new().generate(1_000).unwrap();

        for d in &snapshot.devices {
            let high_load = d.cpu > 80.0 || d.ram > 85.0 || d.temperature > 75.0;
            let expected_status = if high_load { DeviceStatus::HighLoad } else { DeviceStatus::Online };
            let expected_anomaly = if high_load { Anomaly::Anomaly } else { Anomaly::Normal };
            assert_eq!(d.status, expected_status, "{:?}", d);
            assert_eq!(d.anomaly, expected_anomaly, "{:?}", d);
        }
    }

    #[test]
    fn test_ids_and_types_for_default_count() {
        let snapshot = FleetGenerator::new().generate(DEFAULT_DEVICE_COUNT).unwrap();

        let ids: Vec<_> = snapshot.devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["edge-device-1", "edge-device-2", "edge-device-3", "edge-device-4", "edge-device-5"]
        );

        let types: Vec<_> = snapshot.devices.iter().map(|d| d.device_type).collect();
        assert_eq!(
            types,
            vec![
                DeviceType::Sensor,
                DeviceType::Camera,
                DeviceType::Controller,
                DeviceType::Gateway,
                DeviceType::Sensor,
            ]
        );
    }

    #[test]
    fn test_successive_calls_differ_only_numerically() {
        let generator = FleetGenerator::new();
        let first = generator.generate(5).unwrap();
        let second = generator.generate(5).unwrap();

        let structure = |s: &Snapshot| {
            s.devices
                .iter()
                .map(|d| (d.id.clone(), d.device_type))
                .collect::<Vec<_>>()
        };
        assert_eq!(structure(&first), structure(&second));

        let numbers = |s: &Snapshot| {
            s.devices
                .iter()
                .flat_map(|d| [d.cpu, d.ram, d.temperature, d.network_sent, d.network_received])
                .collect::<Vec<_>>()
        };
        assert_ne!(numbers(&first), numbers(&second));
    }

    #[test]
    fn test_zero_count_is_empty() {
        let before = chrono::Utc::now().timestamp();
        let snapshot = assert_ok!(FleetGenerator::new().generate(0));
        let after = chrono::Utc::now().timestamp();

        assert!(snapshot.devices.is_empty());
        assert!(snapshot.timestamp >= before && snapshot.timestamp <= after);
    }

    #[test]
    fn test_oversized_count_rejected() {
        let err = assert_err!(FleetGenerator::new().generate(MAX_DEVICE_COUNT + 1));
        assert_eq!(
            err,
            FleetError::TooManyDevices {
                requested: MAX_DEVICE_COUNT + 1,
                max: MAX_DEVICE_COUNT,
            }
        );

        assert_ok!(FleetGenerator::new().generate(MAX_DEVICE_COUNT));
    }
}
