mod config;

pub use config::{AppConfig, HtmlRenderConfig, LogoConfig, QrConfig, ServerConfig, SvgRenderConfig};
