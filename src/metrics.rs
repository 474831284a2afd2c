//! Prometheus gauges for the simulated fleet

use parking_lot::Mutex;
use prometheus::{
    register_gauge_vec_with_registry, Encoder, GaugeVec, Registry, TextEncoder,
};

use crate::models::{DeviceReading, Snapshot};

const LABELS: &[&str] = &["device_id", "type"];

/// Gauge families for one fleet, backed by a private registry
pub struct FleetMetrics {
    pub(crate) cpu_usage: GaugeVec,
    pub(crate) ram_usage: GaugeVec,
    pub(crate) temperature: GaugeVec,
    pub(crate) network_sent: GaugeVec,
    pub(crate) network_received: GaugeVec,
    pub(crate) anomaly_flag: GaugeVec,

    registry: Registry,
    // Held across record + gather so scrapes never see a half-reset registry
    scrape: Mutex<()>,
}

impl FleetMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cpu_usage = register_gauge_vec_with_registry!(
            "edge_device_cpu_usage_percent",
            "CPU usage of edge device",
            LABELS,
            registry
        )?;

        let ram_usage = register_gauge_vec_with_registry!(
            "edge_device_ram_usage_percent",
            "RAM usage of edge device",
            LABELS,
            registry
        )?;

        let temperature = register_gauge_vec_with_registry!(
            "edge_device_temperature_celsius",
            "Temperature of edge device",
            LABELS,
            registry
        )?;

        let network_sent = register_gauge_vec_with_registry!(
            "edge_device_network_sent_bytes",
            "Network bytes sent",
            LABELS,
            registry
        )?;

        let network_received = register_gauge_vec_with_registry!(
            "edge_device_network_received_bytes",
            "Network bytes received",
            LABELS,
            registry
        )?;

        let anomaly_flag = register_gauge_vec_with_registry!(
            "edge_device_anomaly_flag",
            "1 if anomaly, 0 otherwise",
            LABELS,
            registry
        )?;

        Ok(Self {
            cpu_usage,
            ram_usage,
            temperature,
            network_sent,
            network_received,
            anomaly_flag,
            registry,
            scrape: Mutex::new(()),
        })
    }

    fn families(&self) -> [&GaugeVec; 6] {
        [
            &self.cpu_usage,
            &self.ram_usage,
            &self.temperature,
            &self.network_sent,
            &self.network_received,
            &self.anomaly_flag,
        ]
    }

    /// Replace every gauge with values from `snapshot`.
    ///
    /// All label sets are dropped first, so devices missing from the
    /// snapshot disappear from the next export.
    fn record(&self, snapshot: &Snapshot) {
        for family in self.families() {
            family.reset();
        }

        for device in &snapshot.devices {
            self.set_device(device);
        }
    }

    fn set_device(&self, d: &DeviceReading) {
        let labels = [d.id.as_str(), d.device_type.as_str()];

        self.cpu_usage.with_label_values(&labels).set(d.cpu);
        self.ram_usage.with_label_values(&labels).set(d.ram);
        self.temperature.with_label_values(&labels).set(d.temperature);
        self.network_sent.with_label_values(&labels).set(d.network_sent);
        self.network_received.with_label_values(&labels).set(d.network_received);
        self.anomaly_flag.with_label_values(&labels).set(d.anomaly.flag());
    }

    /// Record `snapshot` and export the registry in Prometheus text format
    pub fn render(&self, snapshot: &Snapshot) -> Result<String, prometheus::Error> {
        let _guard = self.scrape.lock();
        self.record(snapshot);
        self.export()
    }

    fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
