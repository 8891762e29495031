//! Print listener configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Broker host (`<prefix>-ats.iot.<region>.amazonaws.com`)
    pub mqtt_endpoint: String,
    /// 8883, or 443 with ALPN `x-amzn-mqtt-ca`
    pub mqtt_port: u16,
    pub client_id: String,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub root_ca_path: PathBuf,
    pub topic: String,
    /// Upper bound for the initial ConnAck and for the SubAck
    pub connect_timeout: Duration,
    pub keep_alive: Duration,
    pub printer_device: PathBuf,
    /// `host:port` of a network printer; takes precedence over the device
    pub printer_addr: Option<String>,
    /// Characters per line (font A)
    pub paper_width: usize,
    pub timezone: Tz,
}

impl Config {
    /// Defaults for everything except the broker endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            mqtt_endpoint: endpoint.into(),
            mqtt_port: 8883,
            client_id: "kitchen-printer".into(),
            cert_path: PathBuf::from("certs/certificate.pem.crt"),
            key_path: PathBuf::from("certs/private.pem.key"),
            root_ca_path: PathBuf::from("certs/AmazonRootCA1.pem"),
            topic: "printers/orders/print".into(),
            connect_timeout: Duration::from_secs(100),
            keep_alive: Duration::from_secs(30),
            printer_device: PathBuf::from("/dev/usb/lp0"),
            printer_addr: None,
            paper_width: 42,
            timezone: chrono_tz::America::Toronto,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env_opt("MQTT_ENDPOINT").ok_or(ConfigError::Missing("MQTT_ENDPOINT"))?;
        let defaults = Self::with_endpoint(endpoint);

        Ok(Self {
            mqtt_port: env_parse("MQTT_PORT")?.unwrap_or(defaults.mqtt_port),
            client_id: env_opt("MQTT_CLIENT_ID").unwrap_or(defaults.client_id),
            cert_path: env_opt("MQTT_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: env_opt("MQTT_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
            root_ca_path: env_opt("MQTT_ROOT_CA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.root_ca_path),
            topic: env_opt("PRINTER_TOPIC").unwrap_or(defaults.topic),
            connect_timeout: env_parse("CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            keep_alive: env_parse("KEEP_ALIVE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.keep_alive),
            printer_device: env_opt("PRINTER_DEVICE")
                .map(PathBuf::from)
                .unwrap_or(defaults.printer_device),
            printer_addr: env_opt("PRINTER_ADDR"),
            paper_width: env_parse("PAPER_WIDTH")?.unwrap_or(defaults.paper_width),
            timezone: env_parse("PRINTER_TIMEZONE")?.unwrap_or(defaults.timezone),
            mqtt_endpoint: defaults.mqtt_endpoint,
        })
    }
}

/// Read a variable, treating empty as unset
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    env_opt(name)
        .map(|value| value.parse().map_err(|_| ConfigError::Invalid { name, value }))
        .transpose()
}
