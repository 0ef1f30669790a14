use base64::engine::general_purpose::STANDARD;
use base64::engine::Engine;

/// 构造 HTML 合成文档：二维码以 base64 内联，logo 以外链 URL
/// 叠加为居中的圆形徽章，交给截图服务栅格化
pub fn badge_html(qr_png: &[u8], logo_url: &str, size: u32) -> String {
    let qr_b64 = STANDARD.encode(qr_png);
    let badge = size / 4;
    let half = badge / 2;

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style>
  body {{ margin: 0; }}
  .wrap {{ position: relative; width: {size}px; height: {size}px; }}
  .wrap .qr {{ width: {size}px; height: {size}px; display: block; }}
  .wrap .logo {{
    position: absolute;
    left: 50%;
    top: 50%;
    width: {badge}px;
    height: {badge}px;
    margin-left: -{half}px;
    margin-top: -{half}px;
    border-radius: 50%;
    background: #ffffff;
    object-fit: cover;
  }}
</style>
</head>
<body>
<div class="wrap">
  <img class="qr" src="data:image/png;base64,{qr_b64}">
  <img class="logo" src="{logo_url}">
</div>
</body>
</html>"#
    )
}

/// 构造 SVG 合成文档：二维码与 logo 均以 base64 内联，
/// 中间垫一个白色圆形衬底。logo 内容为空时省略对应元素（中心留白）
pub fn badge_svg(qr_png: &[u8], logo_png: &[u8], size: u32) -> String {
    let qr_b64 = STANDARD.encode(qr_png);
    let center = size / 2;
    let badge = size / 4;
    let offset = center - badge / 2;
    // 衬底半径比 logo 大一圈
    let radius = badge / 2 + 6;

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
  <image x="0" y="0" width="{size}" height="{size}" href="data:image/png;base64,{qr_b64}"/>
  <circle cx="{center}" cy="{center}" r="{radius}" fill="#ffffff"/>
"##
    );

    if !logo_png.is_empty() {
        let logo_b64 = STANDARD.encode(logo_png);
        svg.push_str(&format!(
            "  <image x=\"{offset}\" y=\"{offset}\" width=\"{badge}\" height=\"{badge}\" href=\"data:image/png;base64,{logo_b64}\"/>\n"
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
