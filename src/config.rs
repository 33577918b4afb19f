/// Site configuration loading.
///
/// The service is configured per site from a TOML file (`site.toml` by
/// default): project identity, coordinates, the rain-gauge station, engine
/// parameters, and the URLs of the remote status record and history log.
/// The store bearer token is a secret and comes from the environment
/// (`STORE_TOKEN`, loadable from `.env` via dotenv) rather than the file.

use serde::Deserialize;

use crate::analysis::workability::WorkabilityThresholds;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub engine: EngineSection,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    pub project_name: String,
    /// WGS84 coordinates used by both forecast providers.
    pub latitude: f64,
    pub longitude: f64,
    /// USGS site code of the rain gauge, e.g. "02091500".
    pub usgs_station: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Trailing window for the antecedent precipitation index, days.
    pub window_days: usize,
    /// Daily decay factor, in (0, 1).
    pub decay: f64,
    /// Ascending workability thresholds.
    pub saturated_threshold: f64,
    pub critical_threshold: f64,
    pub restricted_threshold: f64,
}

impl EngineSection {
    pub fn thresholds(&self) -> WorkabilityThresholds {
        WorkabilityThresholds {
            saturated: self.saturated_threshold,
            critical: self.critical_threshold,
            restricted: self.restricted_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// URL of the versioned status record resource.
    pub status_url: String,
    /// URL of the versioned history log resource.
    pub history_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    /// A value parsed but is out of its valid range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads and validates a site configuration file.
pub fn load_config(path: &str) -> Result<SiteConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
    parse_config(&text)
}

/// Parses configuration text. Split from `load_config` so tests need no
/// filesystem.
pub fn parse_config(text: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig =
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &SiteConfig) -> Result<(), ConfigError> {
    let engine = &config.engine;
    if !(engine.decay > 0.0 && engine.decay < 1.0) {
        return Err(ConfigError::Invalid(format!(
            "decay must be in (0, 1), got {}",
            engine.decay,
        )));
    }
    if engine.window_days == 0 {
        return Err(ConfigError::Invalid("window_days must be at least 1".to_string()));
    }
    if !(engine.saturated_threshold < engine.critical_threshold
        && engine.critical_threshold < engine.restricted_threshold)
    {
        return Err(ConfigError::Invalid(
            "workability thresholds must be strictly ascending".to_string(),
        ));
    }
    Ok(())
}

/// The store bearer token, if configured in the environment.
pub fn store_token_from_env() -> Option<String> {
    std::env::var("STORE_TOKEN").ok().filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [site]
        project_name = "J&J LMDS - Wilson, NC"
        latitude = 35.7413
        longitude = -77.9938
        usgs_station = "02091500"

        [engine]
        window_days = 5
        decay = 0.85
        saturated_threshold = 0.30
        critical_threshold = 0.60
        restricted_threshold = 0.85

        [store]
        status_url = "https://store.example.com/sites/wilson/status.json"
        history_url = "https://store.example.com/sites/wilson/history.csv"
    "#;

    #[test]
    fn test_sample_config_parses() {
        let config = parse_config(SAMPLE).expect("sample config should parse");
        assert_eq!(config.site.usgs_station, "02091500");
        assert_eq!(config.engine.window_days, 5);
        assert_eq!(config.engine.thresholds().restricted, 0.85);
        assert!(config.store.history_url.ends_with("history.csv"));
    }

    #[test]
    fn test_decay_outside_unit_interval_is_rejected() {
        let bad = SAMPLE.replace("decay = 0.85", "decay = 1.5");
        let err = parse_config(&bad).expect_err("decay 1.5 should be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unordered_thresholds_are_rejected() {
        let bad = SAMPLE.replace("critical_threshold = 0.60", "critical_threshold = 0.90");
        let err = parse_config(&bad).expect_err("descending thresholds should be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_section_is_a_parse_error() {
        let err = parse_config("[site]\nproject_name = \"x\"")
            .expect_err("incomplete config should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
