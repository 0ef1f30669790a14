use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub text: Option<String>,
}

/// 合成结果的声明类型，决定响应的 Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContentType {
    Png,
    Svg,
}

impl ImageContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageContentType::Png => "image/png",
            ImageContentType::Svg => "image/svg+xml",
        }
    }
}

#[derive(Debug)]
pub struct ComposedImage {
    pub bytes: Vec<u8>,
    pub content_type: ImageContentType,
}
