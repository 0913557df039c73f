use std::path::{Path, PathBuf};

use cockpit_common::{Error, Result};
use tracing::{info, warn};

use crate::model::AppConfig;

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Result<Self> {
        let config_dir = Self::default_config_dir();
        Ok(Self { config_dir })
    }

    pub fn default_config_dir() -> PathBuf {
        let home_config = dirs::home_dir().map(|h| h.join(".greenhill-cockpit"));
        let xdg_config = dirs::config_dir().map(|c| c.join("greenhill-cockpit"));

        match (xdg_config, home_config) {
            (Some(xdg), Some(home)) => {
                if !xdg.exists() && home.exists() {
                    home
                } else {
                    xdg
                }
            }
            (Some(xdg), None) => xdg,
            (None, Some(home)) => home,
            (None, None) => PathBuf::from(".greenhill-cockpit"),
        }
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn load(&self) -> Result<AppConfig> {
        let yaml_path = self.config_dir.join("config.yml");
        let toml_path = self.config_dir.join("config.toml");

        if yaml_path.exists() {
            info!("loading config from {}", yaml_path.display());
            let contents = std::fs::read_to_string(&yaml_path)?;
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))
        } else if toml_path.exists() {
            info!("loading config from {}", toml_path.display());
            let contents = std::fs::read_to_string(&toml_path)?;
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse TOML config: {e}")))
        } else {
            info!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// Load the config file and then apply process environment overrides.
    ///
    /// This is the only place the process environment is read.
    pub fn load_with_env(&self) -> Result<AppConfig> {
        let mut config = self.load()?;
        apply_env(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }
}

/// Apply environment-style overrides on top of a loaded config.
///
/// Recognized keys: `LANGGRAPH_BASE_URL`, `LANGGRAPH_API_KEY`,
/// `LANGGRAPH_TIMEOUT_SECS`, `CORS_ALLOW_ORIGINS`, `HOST`, `PORT`,
/// `GHC_DT_EVIDENCE_LOG`.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // An explicitly empty base URL clears a file-configured remote.
    if let Some(url) = lookup("LANGGRAPH_BASE_URL") {
        let url = url.trim();
        config.remote.base_url = (!url.is_empty()).then(|| url.to_string());
    }

    if let Some(key) = non_empty(&lookup, "LANGGRAPH_API_KEY") {
        config.remote.api_key = Some(key);
    }

    if let Some(secs) = non_empty(&lookup, "LANGGRAPH_TIMEOUT_SECS") {
        config.remote.timeout_secs = secs
            .parse()
            .map_err(|e| Error::Config(format!("invalid LANGGRAPH_TIMEOUT_SECS '{secs}': {e}")))?;
    }

    if let Some(origins) = lookup("CORS_ALLOW_ORIGINS") {
        config.gateway.cors_allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(host) = non_empty(&lookup, "HOST") {
        config.gateway.host = host;
    }

    if let Some(port) = non_empty(&lookup, "PORT") {
        config.gateway.port = port
            .parse()
            .map_err(|e| Error::Config(format!("invalid PORT '{port}': {e}")))?;
    }

    if let Some(path) = non_empty(&lookup, "GHC_DT_EVIDENCE_LOG") {
        config.evidence_log = Some(PathBuf::from(path));
    }

    if let Some(url) = config.remote.base_url()
        && url::Url::parse(url).is_err()
    {
        warn!("remote base URL '{url}' does not parse as an absolute URL");
    }

    Ok(())
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{ConfigLoader, apply_env};
    use crate::model::AppConfig;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "cockpit-config-test-{}-{}-{}",
            label,
            std::process::id(),
            nanos
        ))
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn load_returns_default_when_no_config_exists() {
        let dir = temp_dir("default");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        let loader = ConfigLoader::with_dir(&dir);
        let config = loader.load().expect("load should succeed");

        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8080);
        assert!(config.gateway.cors_allowed_origins.is_empty());
        assert!(!config.remote.is_configured());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_prefers_yaml_over_toml_when_both_exist() {
        let dir = temp_dir("yaml-precedence");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        fs::write(
            dir.join("config.yml"),
            "gateway:\n  port: 4001\nremote:\n  base_url: \"http://yaml\"\n",
        )
        .expect("failed to write yaml config");
        fs::write(dir.join("config.toml"), "[gateway]\nport = 4999\n")
            .expect("failed to write toml config");

        let config = ConfigLoader::with_dir(&dir).load().expect("load should succeed");

        assert_eq!(config.gateway.port, 4001);
        assert_eq!(config.remote.base_url(), Some("http://yaml"));
        assert_eq!(config.remote.timeout_secs, 30);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_reads_toml_when_yaml_missing() {
        let dir = temp_dir("toml");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        fs::write(
            dir.join("config.toml"),
            "[gateway]\nhost = \"0.0.0.0\"\ncors_allowed_origins = [\"https://cockpit.example\"]\n\n[remote]\ntimeout_secs = 5\n",
        )
        .expect("failed to write toml config");

        let config = ConfigLoader::with_dir(&dir).load().expect("load should succeed");

        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(
            config.gateway.cors_allowed_origins,
            vec!["https://cockpit.example".to_string()]
        );
        assert_eq!(config.remote.timeout_secs, 5);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_rejects_malformed_yaml() {
        let dir = temp_dir("bad-yaml");
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        fs::write(dir.join("config.yml"), "gateway: [unclosed").expect("failed to write yaml");

        let err = ConfigLoader::with_dir(&dir).load().unwrap_err();
        assert!(err.to_string().contains("YAML"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn env_selects_remote_and_attaches_key() {
        let mut config = AppConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("LANGGRAPH_BASE_URL", " https://graphs.example "),
                ("LANGGRAPH_API_KEY", "lg-key"),
                ("LANGGRAPH_TIMEOUT_SECS", "12"),
            ]),
        )
        .unwrap();

        assert_eq!(config.remote.base_url(), Some("https://graphs.example"));
        assert_eq!(config.remote.api_key(), Some("lg-key"));
        assert_eq!(config.remote.timeout_secs, 12);
    }

    #[test]
    fn empty_base_url_env_clears_file_remote() {
        let mut config = AppConfig::default();
        config.remote.base_url = Some("http://from-file".to_string());

        apply_env(&mut config, env(&[("LANGGRAPH_BASE_URL", "")])).unwrap();

        assert!(!config.remote.is_configured());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut config = AppConfig::default();
        apply_env(
            &mut config,
            env(&[("CORS_ALLOW_ORIGINS", "https://a.example, ,https://b.example ")]),
        )
        .unwrap();

        assert_eq!(
            config.gateway.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn port_and_evidence_log_overrides() {
        let mut config = AppConfig::default();
        apply_env(
            &mut config,
            env(&[("PORT", "9090"), ("GHC_DT_EVIDENCE_LOG", "/tmp/evidence.jsonl")]),
        )
        .unwrap();

        assert_eq!(config.gateway.port, 9090);
        assert_eq!(
            config.evidence_log,
            Some(PathBuf::from("/tmp/evidence.jsonl"))
        );
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let mut config = AppConfig::default();
        let err = apply_env(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn unset_env_leaves_config_unchanged() {
        let mut config = AppConfig::default();
        config.remote.base_url = Some("http://from-file".to_string());
        apply_env(&mut config, env(&[])).unwrap();
        assert_eq!(config.remote.base_url(), Some("http://from-file"));
        assert_eq!(config.gateway.port, 8080);
    }
}
