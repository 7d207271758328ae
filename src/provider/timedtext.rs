//! Parser for YouTube's timed-text caption documents.
//!
//! The document is a flat list of `<text start=".." dur="..">..</text>` elements. Caption text
//! is entity-encoded twice (once by the XML layer, once by the caption itself) and may carry
//! inline formatting tags, which are removed.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::OnceLock;

use super::{FetchError, TranscriptSegment};

fn text_element_regex() -> &'static Regex {
    static TEXT_ELEMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    TEXT_ELEMENT_REGEX.get_or_init(|| {
        Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)")
            .expect("Failed to compile text element regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*"([^"]*)""#)
            .expect("Failed to compile attribute regex")
    })
}

pub fn html_tag_regex() -> &'static Regex {
    static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    HTML_TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Failed to compile HTML tag regex"))
}

/// Parse a timed-text document into segments, in document order
pub fn parse_timedtext(document: &str) -> Result<Vec<TranscriptSegment>, FetchError> {
    if !document.contains("<transcript") {
        return Err(FetchError::InvalidResponse(
            "caption document has no transcript element".to_string(),
        ));
    }

    let segments = text_element_regex()
        .captures_iter(document)
        .filter_map(|captures| {
            // Empty elements carry no caption
            let raw_text = captures.get(2)?.as_str();
            if raw_text.is_empty() {
                return None;
            }

            let attributes = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            Some(TranscriptSegment {
                text: clean_text(raw_text),
                start: float_attribute(attributes, "start"),
                duration: float_attribute(attributes, "dur"),
            })
        })
        .collect();

    Ok(segments)
}

fn clean_text(raw_text: &str) -> String {
    let xml_decoded = decode_html_entities(raw_text);
    let html_decoded = decode_html_entities(&xml_decoded);
    html_tag_regex().replace_all(&html_decoded, "").into_owned()
}

fn float_attribute(attributes: &str, name: &str) -> f64 {
    attribute_regex()
        .captures_iter(attributes)
        .find(|captures| &captures[1] == name)
        .and_then(|captures| captures[2].parse::<f64>().ok())
        .unwrap_or(0.0)
}
