use std::sync::Arc;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// 外部二维码服务客户端，同时负责获取固定 logo 资源
#[derive(Clone)]
pub struct QrClient {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl QrClient {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// 请求基础二维码 PNG，这是整条链路唯一的致命失败点
    pub async fn generate(&self, text: &str, size: u32) -> AppResult<Vec<u8>> {
        let qr = &self.config.qr;

        let resp = match self.http
            .get(&qr.endpoint)
            .query(&[
                ("size", format!("{}x{}", size, size)),
                ("data", text.to_string()),
                ("format", "png".to_string()),
                ("margin", qr.margin.to_string()),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("二维码服务请求失败: {}", e);
                return Err(AppError::QrGeneration);
            }
        };

        if !resp.status().is_success() {
            tracing::error!("二维码服务返回异常状态: {}", resp.status());
            return Err(AppError::QrGeneration);
        }

        match resp.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) => {
                tracing::error!("读取二维码响应失败: {}", e);
                Err(AppError::QrGeneration)
            }
        }
    }

    /// 获取 logo 图片。非成功状态返回空内容（徽章中心留白），
    /// 传输层错误向上传播，由合成管线兜底
    pub async fn fetch_logo(&self) -> AppResult<Vec<u8>> {
        let resp = self.http.get(&self.config.logo.url).send().await?;

        if !resp.status().is_success() {
            tracing::warn!("logo 获取返回 {}，继续使用空内容", resp.status());
            return Ok(Vec::new());
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
