// src/config.rs

use crate::core::knowledge_base;
use crate::logging::get_config_dir;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";

/// Points and thresholds used by the risk engine. The values are heuristics,
/// so they are kept configurable rather than baked into the scoring code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub open_port_high: u32,
    pub open_port_medium: u32,
    pub open_port_other: u32,
    pub finding_high: u32,
    pub finding_medium: u32,
    pub high_threshold: u32,
    pub medium_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            open_port_high: 3,
            open_port_medium: 2,
            open_port_other: 1,
            finding_high: 5,
            finding_medium: 3,
            high_threshold: 10,
            medium_threshold: 5,
        }
    }
}

/// Runtime knobs for a scan. Every field has a default, so a partial
/// `config.json` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub ports: Vec<u16>,
    /// An open port from this list triggers the header analysis.
    pub web_ports: Vec<u16>,
    pub connect_timeout_ms: u64,
    pub ping_timeout_ms: u64,
    pub http_timeout_ms: u64,
    pub max_concurrency: usize,
    pub user_agent: String,
    pub scoring: ScoringConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: knowledge_base::canonical_ports(),
            web_ports: vec![80, 443],
            connect_timeout_ms: 500,
            ping_timeout_ms: 1000,
            http_timeout_ms: 3000,
            max_concurrency: 20,
            user_agent: format!("KryptAnalyzer/{}", env!("CARGO_PKG_VERSION")),
            scoring: ScoringConfig::default(),
        }
    }
}

impl ScanConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Loads `config.json` from the platform config directory.
    pub fn load() -> Self {
        Self::load_from(&get_config_dir().join(CONFIG_FILE))
    }

    /// A missing file yields the defaults; a malformed one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                info!(path = %path.display(), "No config file found, using defaults.");
                return Self::default();
            }
        };
        match serde_json::from_str::<ScanConfig>(&raw) {
            Ok(mut config) => {
                config.ports.sort_unstable();
                config.ports.dedup();
                config.max_concurrency = config.max_concurrency.max(1);
                info!(path = %path.display(), ports = ?config.ports, "Loaded config file.");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file is malformed, using defaults.");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("krypt-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_match_canonical_values() {
        let config = ScanConfig::default();
        assert_eq!(config.ports, vec![21, 22, 80, 443, 3306, 8080]);
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_concurrency, 20);
        assert_eq!(config.scoring.high_threshold, 10);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let path = temp_file("partial", r#"{"ports": [8080, 22, 22], "scoring": {"high_threshold": 12}}"#);
        let config = ScanConfig::load_from(&path);
        assert_eq!(config.ports, vec![22, 8080]);
        assert_eq!(config.scoring.high_threshold, 12);
        assert_eq!(config.scoring.medium_threshold, 5);
        assert_eq!(config.http_timeout_ms, 3000);
    }

    #[test]
    fn malformed_or_missing_file_yields_defaults() {
        let path = temp_file("broken", "{ not json");
        assert_eq!(ScanConfig::load_from(&path), ScanConfig::default());
        assert_eq!(
            ScanConfig::load_from(Path::new("/definitely/not/here.json")),
            ScanConfig::default()
        );
    }
}
