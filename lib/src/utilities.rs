use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;


/// Image encodings the vision model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageEncoding {
    fn from_subtype(subtype: &str) -> Self {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            _ => Self::Jpeg,
        }
    }
}

// "data:image/png;base64,AAAA" -> (Png, "AAAA")
pub fn strip_data_url(image: &str) -> (ImageEncoding, &str) {
    let image = image.trim();
    let Some(rest) = image.strip_prefix("data:image/") else {
        return (ImageEncoding::Jpeg, image);
    };
    match rest.split_once(";base64,") {
        Some((subtype, payload)) => (ImageEncoding::from_subtype(subtype), payload),
        None => (ImageEncoding::Jpeg, image),
    }
}

pub fn decode_image(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .context("image is not valid base64")
}


/// Slice out the JSON document inside a model reply.
///
/// Whichever of `{` or `[` comes first decides the document kind; the slice
/// runs to the last matching closer. Markdown fences and chatter around the
/// payload fall away.
pub fn extract_json(text: &str) -> &str {
    let object = text.find('{');
    let array = text.find('[');

    let (start, closer) = match (object, array) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return text.trim(),
    };

    match text.rfind(closer) {
        Some(end) if end > start => &text[start..=end],
        _ => text.trim(),
    }
}

pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = extract_json(text);
    serde_json::from_str(json).with_context(|| format!("model reply is not the expected JSON: {}", json))
}


// 225000 -> "3:45"
pub fn format_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}
