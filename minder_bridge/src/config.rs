use std::{path::Path, time::Duration};

use crate::{
    correlation::DEFAULT_ID_LENGTH,
    error::{BridgeError, BridgeResult},
    host::{DEFAULT_READINESS_EVENT, DEFAULT_READINESS_PROBE},
};

// -------------------------------------------------------------------------------------------------------

/// ids shorter than this make accidental collisions between live registrations plausible
const MIN_ID_LENGTH: usize = 8;

// note: the config file is json, missing fields take their defaults
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// method that must exist on the host before the boundary considers itself connected
    pub readiness_probe: String,
    /// event the host fires when its method table becomes available
    pub readiness_event: String,
    /// length of minted correlation ids
    pub id_length: usize,
    /// upper bound for a single backend call, unbounded if absent
    pub call_timeout_ms: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            readiness_probe: DEFAULT_READINESS_PROBE.to_string(),
            readiness_event: DEFAULT_READINESS_EVENT.to_string(),
            id_length: DEFAULT_ID_LENGTH,
            call_timeout_ms: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(text: &str) -> BridgeResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| BridgeError::Config {
                reason: err.to_string(),
            })?;
        // serde would also fill the struct from a positional array
        if !value.is_object() {
            return Err(BridgeError::Config {
                reason: format!("expected a json object, got {}", value),
            });
        }
        let config: BridgeConfig =
            serde_json::from_value(value).map_err(|err| BridgeError::Config {
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| BridgeError::Config {
            reason: format!("unable to read {}: {}", path.display(), err),
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.readiness_probe.trim().is_empty() {
            return Err(BridgeError::Config {
                reason: "readiness_probe must name a method".to_string(),
            });
        }
        if self.id_length < MIN_ID_LENGTH {
            return Err(BridgeError::Config {
                reason: format!(
                    "id_length must be at least {}, got {}",
                    MIN_ID_LENGTH, self.id_length
                ),
            });
        }
        if self.call_timeout_ms == Some(0) {
            return Err(BridgeError::Config {
                reason: "call_timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = BridgeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.readiness_probe, "info");
        assert_eq!(config.readiness_event, "pywebviewready");
        assert_eq!(config.id_length, 12);
        assert_eq!(config.call_timeout(), None);
    }

    #[test]
    fn overrides_are_applied() {
        let config =
            BridgeConfig::from_json_str(r#"{"id_length": 16, "call_timeout_ms": 2500}"#).unwrap();
        assert_eq!(config.id_length, 16);
        assert_eq!(config.call_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for text in [
            r#"{"id_length": 4}"#,
            r#"{"readiness_probe": " "}"#,
            r#"{"call_timeout_ms": 0}"#,
            r#"{"unknown": true}"#,
            "[]",
            r#"["info", "pywebviewready", 12, null]"#,
            "12",
            "not json",
        ] {
            assert!(
                matches!(
                    BridgeConfig::from_json_str(text),
                    Err(BridgeError::Config { .. })
                ),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = BridgeConfig::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(BridgeError::Config { .. })));
    }
}
