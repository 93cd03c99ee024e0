//! Process-wide options, loaded once at startup.
//!
//! The options file is the add-on's `options.json`. It is shared with other
//! components, so unknown keys are ignored. A missing file is not an error:
//! every field falls back to its default.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use relay_client::{ClientConfig, SequencerConfig};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::GatewayError;
use crate::routes::{HEALTH_PATH, MODEL_DATA_PATH, RESULTS_PATH};

/// Where the options file is looked up when no override is given.
pub const DEFAULT_OPTIONS_PATH: &str = "data/options.json";

/// Environment variable overriding [`DEFAULT_OPTIONS_PATH`].
pub const OPTIONS_PATH_ENV: &str = "HASS_RELAY_OPTIONS";

/// Read-only server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ServerOptions {
    /// Address the relay binds to.
    pub listen_ip: String,
    /// Port the relay binds to. Accepts `8000` or `"8000"`.
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    /// Token for entity-control requests to the hub. A non-string value is
    /// kept as absent, so the credential gate refuses it at dispatch time.
    #[serde(deserialize_with = "token_from_any")]
    pub hass_token: Option<String>,
    /// Inbound path to downstream URL, in registration order.
    pub forward_routes: IndexMap<String, String>,
    /// YAML resource served on `GET /to_hertta/model_data`.
    pub model_data_path: PathBuf,
    /// When set, optimization results are appended here as JSON lines.
    pub results_path: Option<PathBuf>,
    /// Bound on every outbound exchange.
    pub request_timeout_secs: u64,
    /// Values dispatched per control sequence.
    pub control_cap: usize,
    /// Pause between two control values.
    pub control_delay_secs: u64,
    /// Largest accepted request body. `None` accepts any size.
    pub max_body_bytes: Option<usize>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            listen_ip: "0.0.0.0".to_owned(),
            port: 8000,
            hass_token: None,
            forward_routes: default_forward_routes(),
            model_data_path: PathBuf::from("model_data.yaml"),
            results_path: None,
            request_timeout_secs: relay_client::config::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            control_cap: relay_client::config::DEFAULT_CONTROL_CAP,
            control_delay_secs: relay_client::config::DEFAULT_CONTROL_DELAY.as_secs(),
            max_body_bytes: None,
        }
    }
}

/// Hub traffic goes to the optimizer on 8002; optimizer traffic to the hub
/// side on 8001.
fn default_forward_routes() -> IndexMap<String, String> {
    IndexMap::from([
        ("/from_hass/post".to_owned(), "http://127.0.0.1:8002/from_hass/post".to_owned()),
        ("/to_hass/post".to_owned(), "http://127.0.0.1:8001/to_hass/post".to_owned()),
    ])
}

impl ServerOptions {
    /// Path of the options file: `$HASS_RELAY_OPTIONS` or the default.
    #[must_use]
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(OPTIONS_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_OPTIONS_PATH), PathBuf::from)
    }

    /// Load options from `path`, falling back to defaults if it is absent.
    ///
    /// # Errors
    /// Returns [`GatewayError::Options`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no options file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GatewayError::Options {
                    path: path.to_owned(),
                    reason: e.to_string(),
                })
            }
        };
        Self::from_json(&text).map_err(|reason| GatewayError::Options {
            path: path.to_owned(),
            reason,
        })
    }

    /// Parse options from JSON text.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let options: Self = serde_json::from_str(text).map_err(|e| e.to_string())?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), String> {
        for (path, url) in &self.forward_routes {
            if !path.starts_with('/') {
                return Err(format!("forward route '{path}' must start with '/'"));
            }
            if path.contains(['{', '}']) || path.split('/').any(|seg| seg.starts_with([':', '*'])) {
                return Err(format!("forward route '{path}' must be a literal path"));
            }
            if [RESULTS_PATH, MODEL_DATA_PATH, HEALTH_PATH].contains(&path.as_str()) {
                return Err(format!("forward route '{path}' collides with a built-in route"));
            }
            if url.is_empty() {
                return Err(format!("forward route '{path}' has an empty target URL"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_owned());
        }
        Ok(())
    }

    /// `ip:port` for binding, with IPv6 literals bracketed.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        if self.listen_ip.contains(':') {
            format!("[{}]:{}", self.listen_ip, self.port)
        } else {
            format!("{}:{}", self.listen_ip, self.port)
        }
    }

    /// Settings for the forwarding proxy and dispatcher.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(Duration::from_secs(self.request_timeout_secs))
    }

    /// Settings for the control sequencer.
    #[must_use]
    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig::new(self.control_cap, Duration::from_secs(self.control_delay_secs))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

fn token_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Null => Ok(None),
        other => {
            tracing::warn!(kind = json_kind(&other), "hass_token is not a string; ignoring it");
            Ok(None)
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn port_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let raw = match PortValue::deserialize(deserializer)? {
        PortValue::Number(n) => n,
        PortValue::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("port '{s}' is not a number")))?,
    };
    u16::try_from(raw).map_err(|_| de::Error::custom(format!("port {raw} is out of range")))
}
