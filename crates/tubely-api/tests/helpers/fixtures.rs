use axum_test::multipart::{MultipartForm, Part};

/// Bytes standing in for an MP4 file; the fake tools never parse them.
pub fn fake_mp4() -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.extend_from_slice(&[0xAB; 4096]);
    data
}

/// Minimal PNG signature plus padding.
pub fn fake_png(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(len.max(data.len()), 0);
    data
}

/// Form with a single file field.
pub fn file_form(field: &str, data: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        field.to_string(),
        Part::bytes(data).file_name(file_name).mime_type(mime),
    )
}

pub fn video_form(data: Vec<u8>) -> MultipartForm {
    file_form("video", data, "boots.mp4", "video/mp4")
}

pub fn thumbnail_form(data: Vec<u8>, mime: &str) -> MultipartForm {
    file_form("thumbnail", data, "thumb.png", mime)
}

/// Split `{base}/{path}?{query}` into the path and its query pairs.
pub fn split_signed_url<'a>(url: &'a str, base: &str) -> (&'a str, Vec<(&'a str, &'a str)>) {
    let relative = &url[base.len()..];
    let (path, query) = relative.split_once('?').unwrap_or((relative, ""));
    let pairs = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();
    (path, pairs)
}
