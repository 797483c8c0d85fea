// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use cities_app::{DEFAULT_LIMIT, LIMIT_RANGE};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const APP_NAME: &str = "cities";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "https://wft-geo-db.p.rapidapi.com/v1";
const DEFAULT_API_HOST: &str = "wft-geo-db.p.rapidapi.com";
const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_CONFIG_PATH: &str = "CITIES_CONFIG_PATH";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_HOST: &str = "API_HOST";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub key: Option<String>,
    pub host: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            key: None,
            host: Some(DEFAULT_API_HOST.to_owned()),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_limit: Option<u32>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_limit: Some(DEFAULT_LIMIT),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {ENV_CONFIG_PATH} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(limit) = self.ui.default_limit
            && !LIMIT_RANGE.contains(&limit)
        {
            bail!(
                "ui.default_limit in {} must be between {} and {}, got {}",
                path.display(),
                LIMIT_RANGE.start(),
                LIMIT_RANGE.end(),
                limit
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(level) = &self.log.level {
            LevelFilter::from_str(level).map_err(|_| {
                anyhow!(
                    "log.level in {} must be one of off, error, warn, info, debug, trace; got {:?}",
                    path.display(),
                    level
                )
            })?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> String {
        env_override(ENV_API_BASE_URL)
            .unwrap_or_else(|| {
                self.api
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            })
            .trim_end_matches('/')
            .to_owned()
    }

    pub fn api_key(&self) -> String {
        env_override(ENV_API_KEY)
            .or_else(|| self.api.key.clone())
            .unwrap_or_default()
    }

    pub fn api_host(&self) -> String {
        env_override(ENV_API_HOST).unwrap_or_else(|| {
            self.api
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_API_HOST.to_owned())
        })
    }

    pub fn api_timeout(&self) -> Result<Option<Duration>> {
        self.api.timeout.as_deref().map(parse_duration).transpose()
    }

    pub fn default_limit(&self) -> u32 {
        self.ui.default_limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
            .unwrap_or(LevelFilter::Info)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let cache_root = dirs::cache_dir()
            .ok_or_else(|| anyhow!("cannot resolve cache directory; set [log].path"))?;
        Ok(cache_root.join(APP_NAME).join("cities.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# cities config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# {ENV_API_BASE_URL}, {ENV_API_KEY} and {ENV_API_HOST} override these values\nbase_url = \"{}\"\nkey = \"\"\nhost = \"{}\"\n# Optional. Unset keeps the HTTP client's default\n# timeout = \"10s\"\n\n[ui]\ndefault_limit = {}\n\n[log]\n# Optional. Default is the platform cache dir (for example ~/.cache/cities/cities.log)\n# path = \"/absolute/path/to/cities.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_HOST,
            DEFAULT_LIMIT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ENV_API_BASE_URL, ENV_API_HOST, ENV_API_KEY, ENV_CONFIG_PATH, parse_duration,
    };
    use anyhow::Result;
    use log::LevelFilter;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn clear_api_env() {
        // SAFETY: test-only process-local env mutation, serialized by env_lock.
        unsafe {
            std::env::remove_var(ENV_API_BASE_URL);
            std::env::remove_var(ENV_API_KEY);
            std::env::remove_var(ENV_API_HOST);
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let _guard = env_lock();
        clear_api_env();
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.default_limit(), 5);
        assert_eq!(config.api_base_url(), "https://wft-geo-db.p.rapidapi.com/v1");
        assert_eq!(config.api_host(), "wft-geo-db.p.rapidapi.com");
        assert_eq!(config.api_key(), "");
        assert_eq!(config.api_timeout()?, None);
        assert_eq!(config.log_level(), LevelFilter::Info);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nkey=\"abc\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let _guard = env_lock();
        clear_api_env();
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://localhost:8080/v1/\"\nkey = \"k\"\nhost = \"h\"\ntimeout = \"3s\"\n[ui]\ndefault_limit = 8\n[log]\npath = \"/tmp/cities-test.log\"\nlevel = \"debug\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), "http://localhost:8080/v1");
        assert_eq!(config.api_key(), "k");
        assert_eq!(config.api_host(), "h");
        assert_eq!(config.api_timeout()?, Some(Duration::from_secs(3)));
        assert_eq!(config.default_limit(), 8);
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/cities-test.log"));
        Ok(())
    }

    #[test]
    fn environment_overrides_api_values() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://from-config/v1\"\nkey = \"config-key\"\nhost = \"config-host\"\n",
        )?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(ENV_API_BASE_URL, "http://from-env/v1");
            std::env::set_var(ENV_API_KEY, "env-key");
            std::env::set_var(ENV_API_HOST, "env-host");
        }
        let config = Config::load(&path)?;
        let resolved = (config.api_base_url(), config.api_key(), config.api_host());
        clear_api_env();

        assert_eq!(
            resolved,
            (
                "http://from-env/v1".to_owned(),
                "env-key".to_owned(),
                "env-host".to_owned(),
            )
        );
        Ok(())
    }

    #[test]
    fn blank_environment_values_fall_back_to_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[api]\nkey = \"config-key\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(ENV_API_KEY, "  ");
        }
        let config = Config::load(&path)?;
        let key = config.api_key();
        clear_api_env();
        assert_eq!(key, "config-key");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn default_limit_must_be_in_range() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ndefault_limit = 11\n")?;
        let error = Config::load(&path).expect_err("limit 11 should fail");
        assert!(error.to_string().contains("must be between 1 and 10"));
        Ok(())
    }

    #[test]
    fn timeout_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\ntimeout = \"0ms\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn log_level_must_be_known() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("unknown level should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn parse_duration_accepts_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert!(parse_duration("oops").is_err());
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(ENV_CONFIG_PATH, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(ENV_CONFIG_PATH);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_loader() -> Result<()> {
        let _guard = env_lock();
        clear_api_env();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.default_limit(), 5);
        assert_eq!(config.api_host(), "wft-geo-db.p.rapidapi.com");
        Ok(())
    }
}
