use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    // 主二维码源失败对请求不可恢复，对外只暴露固定文案
    #[error("Failed to generate QR code")]
    QrGeneration,

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

pub type AppResult<T> = Result<T, AppError>;
