use base64::{Engine, engine::general_purpose::STANDARD};

const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// Wrap JPEG bytes in a `data:image/jpeg;base64,` URI.
pub fn jpeg_data_uri(jpeg: &[u8]) -> String {
    let mut uri = String::with_capacity(JPEG_PREFIX.len() + jpeg.len().div_ceil(3) * 4);
    uri.push_str(JPEG_PREFIX);
    STANDARD.encode_string(jpeg, &mut uri);
    uri
}

/// Split a base64 data-URI into its media type and decoded bytes.
pub fn parse_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((media_type.to_string(), bytes))
}
