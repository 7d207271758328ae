//! Video identifier extraction from spreadsheet cells.

use std::fmt;

use crate::workbook::Cell;

/// Opaque token naming a video to YouTube
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Extract the video identifier from a cell, if it holds a recognisable link
pub fn extract_video_id(cell: &Cell) -> Option<VideoId> {
    match cell {
        Cell::Text(url) => video_id_from_url(url),
        _ => None,
    }
}

/// Extract the video identifier from a link.
///
/// Short links (`youtu.be/<id>`) take the last path segment with the query string
/// discarded. Anything else must carry a `v=<id>` parameter, which ends at the next `&`.
/// The token itself is not validated.
pub fn video_id_from_url(url: &str) -> Option<VideoId> {
    let without_query = url.split('?').next().unwrap_or(url);

    let token = if without_query.contains("youtu.be/") {
        without_query.rsplit('/').next()?
    } else {
        let (_, rest) = url.split_once("v=")?;
        rest.split('&').next()?
    };

    if token.is_empty() {
        None
    } else {
        Some(VideoId::from(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> Option<String> {
        video_id_from_url(url).map(|id| id.to_string())
    }

    #[test]
    fn test_short_links() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id("youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_short_link_query_is_ignored() {
        assert_eq!(id("https://youtu.be/CF52N-w4anI?si=abc").as_deref(), Some("CF52N-w4anI"));
        assert_eq!(
            id("https://youtu.be/CF52N-w4anI?si=abc&v=other").as_deref(),
            Some("CF52N-w4anI")
        );
    }

    #[test]
    fn test_v_parameter() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL1").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            id("https://m.youtube.com/watch?feature=share&v=abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_unrecognised_links() {
        assert_eq!(id("https://example.com/not-youtube"), None);
        assert_eq!(id("https://www.youtube.com/shorts/abc123def45"), None);
        assert_eq!(id(""), None);
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(id("https://youtu.be/"), None);
        assert_eq!(id("https://youtu.be/?si=abc"), None);
        assert_eq!(id("https://www.youtube.com/watch?v=&t=1"), None);
    }

    #[test]
    fn test_malformed_token_passes_through() {
        assert_eq!(id("https://youtu.be/not a real id!").as_deref(), Some("not a real id!"));
    }

    #[test]
    fn test_non_text_cells() {
        assert_eq!(extract_video_id(&Cell::Empty), None);
        assert_eq!(extract_video_id(&Cell::Number(42.0)), None);
        assert_eq!(extract_video_id(&Cell::Bool(true)), None);
        assert_eq!(
            extract_video_id(&Cell::Text("https://youtu.be/dQw4w9WgXcQ".to_string())),
            Some(VideoId::from("dQw4w9WgXcQ"))
        );
    }
}
