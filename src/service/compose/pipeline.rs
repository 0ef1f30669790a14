use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::engine::Engine;
use serde::Deserialize;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::model::generate::{ComposedImage, ImageContentType};
use crate::service::compose::markup;
use crate::service::qr::QrClient;

/// HTML 渲染服务成功时返回的结果引用
#[derive(Debug, Deserialize)]
struct RenderReference {
    url: String,
}

/// 图片合成管线：按固定顺序尝试各外部服务，首个成功者胜出。
/// 除基础二维码外，所有阶段的失败都只降级、不上抛
#[derive(Clone)]
pub struct Composer {
    http: reqwest::Client,
    config: Arc<AppConfig>,
    qr_client: QrClient,
}

impl Composer {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        let qr_client = QrClient::new(http.clone(), config.clone());
        Self { http, config, qr_client }
    }

    pub async fn compose(&self, text: &str, size: u32) -> AppResult<ComposedImage> {
        // 1. 基础二维码，失败直接上抛（没有它就没有任何可返回的图）
        let qr_png = self.qr_client.generate(text, size).await?;

        // 2-4. 叠加 logo，任何意外错误都回退到原始二维码
        match self.overlay(&qr_png, size).await {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::warn!("logo 叠加全部失败，返回原始二维码: {:#}", e);
                Ok(ComposedImage {
                    bytes: qr_png,
                    content_type: ImageContentType::Png,
                })
            }
        }
    }

    async fn overlay(&self, qr_png: &[u8], size: u32) -> Result<ComposedImage> {
        // 2. HTML 渲染服务：真实栅格合成，首选路径
        match self.render_html(qr_png, size).await {
            Ok(bytes) => {
                tracing::debug!("HTML 渲染成功 ({} 字节)", bytes.len());
                return Ok(ComposedImage {
                    bytes,
                    content_type: ImageContentType::Png,
                });
            }
            Err(e) => tracing::warn!("HTML 渲染服务失败，降级到 SVG: {:#}", e),
        }

        // 3. 自行构造 SVG 再交给栅格化服务
        let logo_png = self.qr_client.fetch_logo().await?;
        let svg = markup::badge_svg(qr_png, &logo_png, size);

        match self.render_svg(&svg, size).await {
            Ok(bytes) => Ok(ComposedImage {
                bytes,
                content_type: ImageContentType::Png,
            }),
            Err(e) => {
                // 4. 栅格化也失败时直接返回 SVG 原文，浏览器仍可渲染
                tracing::warn!("SVG 栅格化服务失败，返回 SVG 原文: {:#}", e);
                Ok(ComposedImage {
                    bytes: svg.into_bytes(),
                    content_type: ImageContentType::Svg,
                })
            }
        }
    }

    /// 提交 HTML 到截图服务，再取回渲染出的 PNG
    async fn render_html(&self, qr_png: &[u8], size: u32) -> Result<Vec<u8>> {
        let render = &self.config.html_render;
        let html = markup::badge_html(qr_png, &self.config.logo.url, size);

        let resp = self.http
            .post(&render.endpoint)
            .basic_auth(&render.user_id, Some(&render.api_key))
            .json(&serde_json::json!({
                "html": html,
                "width": size,
                "height": size,
                "device_scale_factor": render.device_scale_factor,
            }))
            .send()
            .await
            .context("HTML render request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("HTML render service returned {}", resp.status()));
        }

        let reference: RenderReference = resp.json()
            .await
            .context("HTML render response missing result reference")?;

        let image = self.http
            .get(&reference.url)
            .send()
            .await
            .context("Failed to fetch rendered image")?;

        if !image.status().is_success() {
            return Err(anyhow!("Rendered image fetch returned {}", image.status()));
        }

        Ok(image.bytes().await?.to_vec())
    }

    /// SVG 包装为 data URL 提交到栅格化服务转 PNG
    async fn render_svg(&self, svg: &str, size: u32) -> Result<Vec<u8>> {
        let render = &self.config.svg_render;
        let data_url = format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg));

        let resp = self.http
            .post(&render.endpoint)
            .json(&serde_json::json!({
                "access_key": render.access_key,
                "url": data_url,
                "format": "png",
                "width": size,
                "height": size,
            }))
            .send()
            .await
            .context("SVG render request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("SVG render service returned {}", resp.status()));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HtmlRenderConfig, LogoConfig, QrConfig, ServerConfig, SvgRenderConfig};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QR_PNG: &[u8] = b"\x89PNG\r\n\x1a\nqr-bytes";
    const LOGO_PNG: &[u8] = b"\x89PNG\r\n\x1a\nlogo-bytes";
    const RENDERED_PNG: &[u8] = b"\x89PNG\r\n\x1a\nrendered-bytes";
    const SVG_PNG: &[u8] = b"\x89PNG\r\n\x1a\nsvg-rendered-bytes";

    fn test_config(qr: &str, logo: &str, html: &str, svg: &str) -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            qr: QrConfig {
                endpoint: qr.to_string(),
                size: 300,
                margin: 10,
            },
            logo: LogoConfig { url: logo.to_string() },
            html_render: HtmlRenderConfig {
                endpoint: html.to_string(),
                user_id: "demo".to_string(),
                api_key: "demo".to_string(),
                device_scale_factor: 1,
            },
            svg_render: SvgRenderConfig {
                endpoint: svg.to_string(),
                access_key: "demo".to_string(),
            },
        }
    }

    fn composer(config: AppConfig) -> Composer {
        Composer::new(reqwest::Client::new(), Arc::new(config))
    }

    async fn mount_qr_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/qr"))
            .and(query_param("size", "300x300"))
            .and(query_param("format", "png"))
            .and(query_param("margin", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(QR_PNG))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn qr_service_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/qr"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = test_config(
            &format!("{}/qr", server.uri()),
            &format!("{}/logo.png", server.uri()),
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let err = composer(config).compose("Hello", 300).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate QR code");
    }

    #[tokio::test]
    async fn html_render_path_is_preferred() {
        let server = MockServer::start().await;
        mount_qr_ok(&server).await;

        // demo:demo 的 basic auth
        Mock::given(method("POST"))
            .and(path("/html"))
            .and(header("Authorization", "Basic ZGVtbzpkZW1v"))
            .and(body_partial_json(serde_json::json!({
                "width": 300,
                "height": 300,
                "device_scale_factor": 1,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": format!("{}/rendered.png", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rendered.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(RENDERED_PNG))
            .mount(&server)
            .await;

        let config = test_config(
            &format!("{}/qr", server.uri()),
            &format!("{}/logo.png", server.uri()),
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let image = composer(config).compose("Hello", 300).await.unwrap();
        assert_eq!(image.content_type, ImageContentType::Png);
        assert_eq!(image.bytes, RENDERED_PNG);
    }

    #[tokio::test]
    async fn falls_back_to_svg_render_when_html_fails() {
        let server = MockServer::start().await;
        mount_qr_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(LOGO_PNG))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/svg"))
            .and(body_partial_json(serde_json::json!({
                "access_key": "demo",
                "format": "png",
                "width": 300,
                "height": 300,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(SVG_PNG))
            .mount(&server)
            .await;

        let config = test_config(
            &format!("{}/qr", server.uri()),
            &format!("{}/logo.png", server.uri()),
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let image = composer(config).compose("Hello", 300).await.unwrap();
        assert_eq!(image.content_type, ImageContentType::Png);
        assert_eq!(image.bytes, SVG_PNG);
    }

    #[tokio::test]
    async fn degrades_to_svg_markup_when_both_renderers_fail() {
        let server = MockServer::start().await;
        mount_qr_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        // logo 404 → 空内容继续，徽章中心留白
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/svg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(
            &format!("{}/qr", server.uri()),
            &format!("{}/logo.png", server.uri()),
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let image = composer(config).compose("Hello", 300).await.unwrap();
        assert_eq!(image.content_type, ImageContentType::Svg);

        let svg = String::from_utf8(image.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        // logo 为空时只有二维码这一个 image 元素
        assert_eq!(svg.matches("<image").count(), 1);
    }

    #[tokio::test]
    async fn logo_transport_error_returns_plain_qr() {
        let server = MockServer::start().await;
        mount_qr_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // logo 指向无人监听的端口，触发传输层错误而非 HTTP 错误
        let config = test_config(
            &format!("{}/qr", server.uri()),
            "http://127.0.0.1:1/logo.png",
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let image = composer(config).compose("Hello", 300).await.unwrap();
        assert_eq!(image.content_type, ImageContentType::Png);
        assert_eq!(image.bytes, QR_PNG);
    }

    #[tokio::test]
    async fn text_is_url_encoded_into_qr_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/qr"))
            .and(query_param("data", "你好 world"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(QR_PNG))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/svg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(
            &format!("{}/qr", server.uri()),
            &format!("{}/logo.png", server.uri()),
            &format!("{}/html", server.uri()),
            &format!("{}/svg", server.uri()),
        );

        let image = composer(config).compose("你好 world", 300).await.unwrap();
        assert_eq!(image.content_type, ImageContentType::Svg);
    }
}
