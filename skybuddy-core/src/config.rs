use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ART_CACHE_CAPACITY: usize = 1;

/// External services that take an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    OpenWeather,
    Gemini,
    Stability,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::Gemini => "gemini",
            ServiceId::Stability => "stability",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::Gemini, ServiceId::Stability]
    }

    /// Environment variable that overrides the stored key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "SKYBUDDY_OPENWEATHER_KEY",
            ServiceId::Gemini => "SKYBUDDY_GEMINI_KEY",
            ServiceId::Stability => "SKYBUDDY_STABILITY_KEY",
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "gemini" => Ok(ServiceId::Gemini),
            "stability" => Ok(ServiceId::Stability),
            _ => Err(anyhow!(
                "Unknown service '{value}'. Supported services: openweather, gemini, stability."
            )),
        }
    }
}

/// Credentials for a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: String,
}

/// Base URLs of every remote the app talks to. Overridable for testing and proxies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openweather: String,
    pub open_meteo: String,
    pub open_meteo_geocoding: String,
    pub ipapi: String,
    pub geojs: String,
    pub gemini: String,
    pub stability: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openweather: "https://api.openweathermap.org".into(),
            open_meteo: "https://api.open-meteo.com".into(),
            open_meteo_geocoding: "https://geocoding-api.open-meteo.com".into(),
            ipapi: "https://ipapi.co".into(),
            geojs: "https://get.geojs.io".into(),
            gemini: "https://generativelanguage.googleapis.com".into(),
            stability: "https://api.stability.ai".into(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            openweather: base.clone(),
            open_meteo: base.clone(),
            open_meteo_geocoding: base.clone(),
            ipapi: base.clone(),
            geojs: base.clone(),
            gemini: base.clone(),
            stability: base,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// [services.openweather]
    /// api_key = "..."
    pub services: HashMap<String, ServiceConfig>,

    pub request_timeout_secs: u64,

    /// City searched by `now` instead of IP location, when set.
    pub default_city: Option<String>,

    pub art_cache_capacity: usize,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: HashMap::new(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_city: None,
            art_cache_capacity: DEFAULT_ART_CACHE_CAPACITY,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skybuddy", "skybuddy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay keys from the environment. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for service in ServiceId::all() {
            if let Some(key) = lookup(service.env_var()).filter(|k| !k.trim().is_empty()) {
                self.upsert_service_api_key(*service, key);
            }
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn upsert_service_api_key(&mut self, service: ServiceId, api_key: String) {
        self.services.insert(service.as_str().to_string(), ServiceConfig { api_key });
    }

    /// Returns the API key for a service. Blank keys count as absent.
    pub fn service_api_key(&self, service: ServiceId) -> Option<&str> {
        self.services
            .get(service.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_service_configured(&self, service: ServiceId) -> bool {
        self.service_api_key(service).is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_api_key_for_service() {
        let mut cfg = Config::default();

        cfg.upsert_service_api_key(ServiceId::OpenWeather, "OPEN_KEY".into());

        assert_eq!(cfg.service_api_key(ServiceId::OpenWeather), Some("OPEN_KEY"));
        assert!(cfg.is_service_configured(ServiceId::OpenWeather));
        assert!(!cfg.is_service_configured(ServiceId::Gemini));
    }

    #[test]
    fn upsert_replaces_existing_key() {
        let mut cfg = Config::default();

        cfg.upsert_service_api_key(ServiceId::Gemini, "OLD".into());
        cfg.upsert_service_api_key(ServiceId::Gemini, "NEW".into());

        assert_eq!(cfg.service_api_key(ServiceId::Gemini), Some("NEW"));
        assert_eq!(cfg.services.len(), 1);
    }

    #[test]
    fn blank_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::Stability, "  ".into());
        assert!(!cfg.is_service_configured(ServiceId::Stability));
    }

    #[test]
    fn env_overrides_stored_keys() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::OpenWeather, "FILE".into());

        cfg.apply_env_from(|name| match name {
            "SKYBUDDY_OPENWEATHER_KEY" => Some("ENV".into()),
            "SKYBUDDY_GEMINI_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(cfg.service_api_key(ServiceId::OpenWeather), Some("ENV"));
        assert!(!cfg.is_service_configured(ServiceId::Gemini));
        assert!(!cfg.is_service_configured(ServiceId::Stability));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            default_city = "Lisbon"

            [services.gemini]
            api_key = "G"

            [endpoints]
            gemini = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_city.as_deref(), Some("Lisbon"));
        assert_eq!(cfg.service_api_key(ServiceId::Gemini), Some("G"));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.art_cache_capacity, 1);
        assert_eq!(cfg.endpoints.gemini, "http://localhost:9000");
        assert_eq!(cfg.endpoints.openweather, "https://api.openweathermap.org");
    }

    #[test]
    fn toml_round_trip_keeps_services() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::Stability, "S".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.service_api_key(ServiceId::Stability), Some("S"));
        assert_eq!(back.endpoints, cfg.endpoints);
    }

    #[test]
    fn service_id_parsing() {
        assert_eq!(ServiceId::try_from("Gemini").unwrap(), ServiceId::Gemini);
        let err = ServiceId::try_from("weatherapi").unwrap_err();
        assert!(err.to_string().contains("Unknown service"));
    }
}
