use config::{Config, Environment, File};
use serde::Deserialize;
use anyhow::Context;
use crate::error::AppResult;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub qr: QrConfig,
    pub logo: LogoConfig,
    pub html_render: HtmlRenderConfig,
    pub svg_render: SvgRenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    pub endpoint: String,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_margin")]
    pub margin: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogoConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlRenderConfig {
    pub endpoint: String,
    pub user_id: String,
    pub api_key: String,
    #[serde(default = "default_scale")]
    pub device_scale_factor: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SvgRenderConfig {
    pub endpoint: String,
    pub access_key: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_size() -> u32 {
    300
}

fn default_margin() -> u32 {
    10
}

fn default_scale() -> u32 {
    1
}

impl AppConfig {
    pub async fn load(path: &str) -> AppResult<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("QR_SRV"))
            .build()
            .context("Failed to load config")?;

        let app_config: AppConfig = config.try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }
}
