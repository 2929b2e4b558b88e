//! `x-tos-process` image URL helpers.
//!
//! [图片处理文档](https://www.volcengine.com/docs/6349/103802)

/// Append an image operation to an object URL.
pub fn combine_img_opt(url: &str, img_opt: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}x-tos-process=image/{img_opt}")
}

/// HEIC previews are not renderable in most browsers, serve them as JPG.
pub fn format_heic_to_jpg(url: &str) -> String {
    combine_img_opt(url, "format,jpg")
}

/// Center-cropped resize; either dimension may be omitted.
pub fn resize_img(url: &str, width: Option<u32>, height: Option<u32>) -> String {
    let mut opt = "resize,m_fill".to_owned();
    if let Some(w) = width {
        opt.push_str(&format!(",w_{w}"));
    }
    if let Some(h) = height {
        opt.push_str(&format!(",h_{h}"));
    }
    combine_img_opt(url, &opt)
}
