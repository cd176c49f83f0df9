use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::models::stats::{StatField, StatsSelection};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    pub frame: FrameConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let configured_path = std::env::var("MOXIE_FRAME_CONFIG")
            .unwrap_or_else(|_| "config/frame.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("MOXIE_FRAME_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/frame.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        // MOXIE_FRAME_UPSTREAM__API_KEY and friends
        builder = builder.add_source(
            Environment::with_prefix("MOXIE_FRAME")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize frame configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        assert!(
            self.server.port > 0,
            "Server port must be greater than zero"
        );
        ensure!(!self.upstream.url.trim().is_empty(), "upstream.url must be set");
        ensure!(
            !self.upstream.api_key.trim().is_empty(),
            "upstream.api_key must be set (config file or MOXIE_FRAME_UPSTREAM__API_KEY)"
        );
        ensure!(
            !self.stats.fields.is_empty(),
            "stats.fields must name at least one field"
        );
        for field in [StatField::TodayEarnings, StatField::LifetimeEarnings] {
            ensure!(
                self.stats.fields.contains(field),
                "stats.fields must include {}",
                field.as_str()
            );
        }
        ensure!(
            !self.frame.public_url.trim().is_empty(),
            "frame.public_url must be set"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        assert!(self.port < 65535, "HTTP port must be below 65535");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
    pub url: String,
    pub api_key: String,
    pub request_timeout_ms: Option<u64>,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        let millis = self.request_timeout_ms.unwrap_or(5_000);
        assert!(millis >= 100, "Upstream timeout must be at least 100ms");
        assert!(millis <= 60_000, "Upstream timeout cannot exceed 60 seconds");
        Duration::from_millis(millis)
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub fields: StatsSelection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameConfig {
    /// Absolute URL the `/api` routes are reachable at; button targets hang off it.
    pub public_url: String,
    #[serde(default = "FrameConfig::default_title")]
    pub title: String,
    #[serde(default = "FrameConfig::default_aspect_ratio")]
    pub image_aspect_ratio: String,
    pub home_image: String,
    pub stats_image: String,
    #[serde(default = "FrameConfig::default_compose_url")]
    pub share_compose_url: String,
    #[serde(default = "FrameConfig::default_tagline")]
    pub share_tagline: String,
    #[serde(default = "FrameConfig::default_fallback_text")]
    pub share_fallback_text: String,
}

impl FrameConfig {
    /// `public_url` joined with a route path, without doubled slashes.
    pub fn route_url(&self, path: &str) -> String {
        let base = self.public_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    fn default_title() -> String {
        "$MOXIE Earnings Tracker".to_string()
    }

    fn default_aspect_ratio() -> String {
        "1:1".to_string()
    }

    fn default_compose_url() -> String {
        "https://warpcast.com/~/compose".to_string()
    }

    fn default_tagline() -> String {
        "Check your @moxie.eth stats.".to_string()
    }

    fn default_fallback_text() -> String {
        "Check your @moxie.eth stats on Farcaster!".to_string()
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
