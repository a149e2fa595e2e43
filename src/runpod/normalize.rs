use serde_json::{Map, Value};

use crate::error::{ArtError, Result};

/// Catch-all threshold for the unknown-schema scan. Known weak point: a
/// verbose metadata field longer than this would be mistaken for media, but
/// deployed workflows depend on the behavior, so it stays.
const FALLBACK_TEXT_LEN: usize = 100;

/// Upper bound on the raw-response dump attached to no-media errors.
const DUMP_LIMIT: usize = 1000;

/// The small set of `output` shapes observed across workflow variants.
/// Decoded by an ordered matcher, first match wins.
#[derive(Debug)]
enum OutputShape<'a> {
    /// Mapping with a `message` entry.
    Message(&'a Value),
    /// Mapping with a non-empty `images` sequence.
    Images(&'a [Value]),
    /// Mapping with a `video` entry.
    Video(&'a Value),
    /// Mapping with an `image` entry.
    Image(&'a Value),
    /// Mapping with none of the known keys.
    UnknownMap(&'a Map<String, Value>),
    /// The output itself is a sequence.
    List(&'a [Value]),
    /// The output itself is text.
    Text(&'a Value),
}

fn classify(output: &Value) -> Option<OutputShape<'_>> {
    if let Some(map) = output.as_object() {
        if let Some(value) = map.get("message") {
            return Some(OutputShape::Message(value));
        }
        if let Some(images) = map.get("images").and_then(Value::as_array) {
            if !images.is_empty() {
                return Some(OutputShape::Images(images));
            }
        }
        if let Some(value) = map.get("video") {
            return Some(OutputShape::Video(value));
        }
        if let Some(value) = map.get("image") {
            return Some(OutputShape::Image(value));
        }
        return Some(OutputShape::UnknownMap(map));
    }
    if let Some(list) = output.as_array() {
        return Some(OutputShape::List(list));
    }
    if output.is_string() {
        return Some(OutputShape::Text(output));
    }
    None
}

fn select(output: &Value) -> Option<&Value> {
    match classify(output)? {
        OutputShape::Message(value)
        | OutputShape::Video(value)
        | OutputShape::Image(value)
        | OutputShape::Text(value) => Some(value),
        OutputShape::Images(images) | OutputShape::List(images) => images.first(),
        OutputShape::UnknownMap(map) => map
            .values()
            .find(|value| value.as_str().map_or(false, |s| s.len() > FALLBACK_TEXT_LEN)),
    }
}

/// Some workflows wrap the payload one level deeper; unwrap a single
/// `data`/`image`/`video` layer.
fn unwrap_nested(value: &Value) -> &Value {
    if let Some(map) = value.as_object() {
        for key in ["data", "image", "video"] {
            if let Some(inner) = map.get(key) {
                return inner;
            }
        }
    }
    value
}

/// Walk a parsed upstream body and extract the single base64 media payload.
/// The upstream's output shape is inconsistent across workflow variants, so
/// this applies the ordered shape rules to the `output` field and requires
/// the final candidate to be text.
pub fn extract_media(body: &Value) -> Result<String> {
    let media = body
        .get("output")
        .and_then(select)
        .map(unwrap_nested)
        .and_then(Value::as_str);

    match media {
        Some(text) => Ok(text.to_string()),
        None => Err(ArtError::NoMediaFound(format!(
            "Response: {}",
            truncated_dump(body)
        ))),
    }
}

/// Pretty-printed response body, cut to at most `DUMP_LIMIT` characters for
/// diagnostics.
pub fn truncated_dump(body: &Value) -> String {
    let dump = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
    if dump.chars().count() <= DUMP_LIMIT {
        dump
    } else {
        dump.chars().take(DUMP_LIMIT).collect()
    }
}
