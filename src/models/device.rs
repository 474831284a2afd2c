//! Simulated device model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device kinds, in the order used for positional assignment
pub const DEVICE_TYPES: [DeviceType; 4] = [
    DeviceType::Gateway,
    DeviceType::Sensor,
    DeviceType::Camera,
    DeviceType::Controller,
];

/// CSV column order, matching the JSON keys
pub const CSV_HEADER: [&str; 9] = [
    "id",
    "type",
    "cpu",
    "ram",
    "temp",
    "network_sent",
    "network_received",
    "status",
    "anomaly",
];

pub const CPU_HIGH_LOAD_PERCENT: f64 = 80.0;
pub const RAM_HIGH_LOAD_PERCENT: f64 = 85.0;
pub const TEMP_HIGH_LOAD_CELSIUS: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Gateway,
    Sensor,
    Camera,
    Controller,
}

impl DeviceType {
    /// Type for the 1-indexed device `index`: `DEVICE_TYPES[index % 4]`.
    pub fn for_index(index: usize) -> Self {
        DEVICE_TYPES[index % DEVICE_TYPES.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Gateway => "gateway",
            DeviceType::Sensor => "sensor",
            DeviceType::Camera => "camera",
            DeviceType::Controller => "controller",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Online,
    #[serde(rename = "High Load")]
    HighLoad,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "Online",
            DeviceStatus::HighLoad => "High Load",
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(DeviceStatus::Online),
            "High Load" => Ok(DeviceStatus::HighLoad),
            other => Err(format!("Unknown device status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anomaly {
    Normal,
    Anomaly,
}

impl Anomaly {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anomaly::Normal => "Normal",
            Anomaly::Anomaly => "Anomaly",
        }
    }

    /// Gauge value: 1 for an anomaly, 0 otherwise
    pub fn flag(&self) -> f64 {
        match self {
            Anomaly::Anomaly => 1.0,
            Anomaly::Normal => 0.0,
        }
    }
}

/// One device's synthetic telemetry at capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub cpu: f64,
    pub ram: f64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub network_sent: f64,
    pub network_received: f64,
    pub status: DeviceStatus,
    pub anomaly: Anomaly,
}

impl DeviceReading {
    /// Build a reading from its measured values. Status and anomaly are
    /// both derived from one high-load check.
    pub fn new(
        index: usize,
        cpu: f64,
        ram: f64,
        temperature: f64,
        network_sent: f64,
        network_received: f64,
    ) -> Self {
        let high_load = cpu > CPU_HIGH_LOAD_PERCENT
            || ram > RAM_HIGH_LOAD_PERCENT
            || temperature > TEMP_HIGH_LOAD_CELSIUS;

        let (status, anomaly) = if high_load {
            (DeviceStatus::HighLoad, Anomaly::Anomaly)
        } else {
            (DeviceStatus::Online, Anomaly::Normal)
        };

        Self {
            id: format!("edge-device-{}", index),
            device_type: DeviceType::for_index(index),
            cpu,
            ram,
            temperature,
            network_sent,
            network_received,
            status,
            anomaly,
        }
    }

    pub fn is_high_load(&self) -> bool {
        self.status == DeviceStatus::HighLoad
    }

    fn csv_row(&self) -> String {
        let fields = [
            self.id.clone(),
            self.device_type.to_string(),
            self.cpu.to_string(),
            self.ram.to_string(),
            self.temperature.to_string(),
            self.network_sent.to_string(),
            self.network_received.to_string(),
            self.status.as_str().to_string(),
            self.anomaly.as_str().to_string(),
        ];

        fields
            .iter()
            .map(|f| f.replace(',', ""))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One timestamped set of readings from a single generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub devices: Vec<DeviceReading>,
    pub timestamp: i64,
}

impl Snapshot {
    /// Keep only devices in `status`, preserving order
    pub fn filter_status(mut self, status: DeviceStatus) -> Self {
        self.devices.retain(|d| d.status == status);
        self
    }

    pub fn to_csv(&self) -> String {
        let mut rows = Vec::with_capacity(self.devices.len() + 1);
        rows.push(CSV_HEADER.join(","));
        rows.extend(self.devices.iter().map(DeviceReading::csv_row));
        rows.join("\n")
    }
}

/// Query parameters accepted by the device listing routes
#[derive(Debug, Deserialize, Default)]
pub struct DeviceFilter {
    /// `Online`, `High Load`, or `All`
    pub status: Option<String>,
    pub count: Option<usize>,
}

impl DeviceFilter {
    /// Parsed status filter; `None` when absent or `All`
    pub fn status(&self) -> Result<Option<DeviceStatus>, String> {
        match self.status.as_deref() {
            None | Some("All") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}
