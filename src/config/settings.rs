use super::{default_state_root, ConfigError};
use crate::provider::ProviderKind;
use crate::shared::ids::BackendId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub state_root: Option<PathBuf>,
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    pub decision: DecisionSettings,
}

/// A backend in declaration order; order decides prompt layout and duplicate-name ownership.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    pub id: BackendId,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetrySettings {
    pub path: PathBuf,
    #[serde(default = "default_freshness_ms")]
    pub freshness_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Rediscover lazily on read once the catalog is older than this. `None` means
    /// only startup and explicit refreshes rebuild it.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportSettings {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecisionSettings {
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default = "default_decision_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub binary: Option<String>,
}

fn default_freshness_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_decision_timeout_seconds() -> u64 {
    60
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.state_root {
            if !root.is_absolute() {
                return Err(ConfigError::Settings(
                    "`state_root` must be an absolute path".to_string(),
                ));
            }
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            if !seen.insert(backend.id.as_str()) {
                return Err(ConfigError::Settings(format!(
                    "backend `{}` is declared more than once",
                    backend.id
                )));
            }
            let address = backend.address.trim();
            if !(address.starts_with("http://") || address.starts_with("https://")) {
                return Err(ConfigError::Settings(format!(
                    "backend `{}` address `{}` must start with http:// or https://",
                    backend.id, backend.address
                )));
            }
        }

        if self.telemetry.path.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "`telemetry.path` must be non-empty".to_string(),
            ));
        }
        if self.catalog.max_age_secs == Some(0) {
            return Err(ConfigError::Settings(
                "`catalog.max_age_secs` must be > 0 when set".to_string(),
            ));
        }
        if self.transport.connect_timeout_ms == 0 || self.transport.timeout_ms == 0 {
            return Err(ConfigError::Settings(
                "transport timeouts must be > 0".to_string(),
            ));
        }
        if self.decision.model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`decision.model` must be non-empty".to_string(),
            ));
        }
        if self.decision.timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`decision.timeout_seconds` must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_state_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_root {
            Some(root) => Ok(root.clone()),
            None => default_state_root(),
        }
    }

    pub fn freshness_deadline(&self) -> Duration {
        Duration::from_millis(self.telemetry.freshness_ms)
    }

    pub fn catalog_max_age(&self) -> Option<Duration> {
        self.catalog.max_age_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
state_root: /tmp/seatpilot
backends:
  - id: motor
    address: http://localhost:5051
  - id: knowledge
    address: http://localhost:5052
telemetry:
  path: /tmp/metadata.yaml
decision:
  provider: openai
  model: gpt-4o
"#;

    #[test]
    fn defaults_fill_optional_sections() {
        let settings: Settings = serde_yaml::from_str(MINIMAL).expect("parse settings");
        settings.validate().expect("valid");
        assert_eq!(settings.backends[0].id.as_str(), "motor");
        assert_eq!(settings.backends[1].id.as_str(), "knowledge");
        assert_eq!(settings.freshness_deadline(), Duration::from_secs(5));
        assert_eq!(settings.catalog_max_age(), None);
        assert_eq!(settings.transport.connect_timeout_ms, 2000);
        assert_eq!(settings.transport.timeout_ms, 10_000);
        assert_eq!(settings.decision.provider, ProviderKind::OpenAi);
        assert_eq!(settings.decision.timeout_seconds, 60);
        assert_eq!(
            settings.resolve_state_root().expect("root"),
            PathBuf::from("/tmp/seatpilot")
        );
    }

    #[test]
    fn duplicate_backend_ids_are_rejected() {
        let raw = MINIMAL.replace("id: knowledge", "id: motor");
        let settings: Settings = serde_yaml::from_str(&raw).expect("parse settings");
        let err = settings.validate().expect_err("duplicate backend");
        match err {
            ConfigError::Settings(message) => assert!(message.contains("more than once")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_http_addresses_are_rejected() {
        let raw = MINIMAL.replace("http://localhost:5052", "localhost:5052");
        let settings: Settings = serde_yaml::from_str(&raw).expect("parse settings");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn invalid_backend_id_fails_to_parse() {
        let raw = MINIMAL.replace("id: motor", "id: \"motor backend\"");
        assert!(serde_yaml::from_str::<Settings>(&raw).is_err());
    }
}
