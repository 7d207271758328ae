use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

use super::timedtext::parse_timedtext;
use super::{FetchError, TranscriptProvider, TranscriptSegment};
use crate::extractors::VideoId;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const UNAVAILABLE_REASON: &str = "This video is unavailable";
const BOT_CHECK_REASON: &str = "Sign in to confirm you’re not a bot";
const AGE_GATE_REASON: &str = "This video may be inappropriate for some users.";

fn api_key_regex() -> &'static Regex {
    static API_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
    API_KEY_REGEX.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
            .expect("Failed to compile API key regex")
    })
}

fn consent_value_regex() -> &'static Regex {
    static CONSENT_VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
    CONSENT_VALUE_REGEX.get_or_init(|| {
        Regex::new(r#"name="v" value="(.*?)""#).expect("Failed to compile consent regex")
    })
}

/// Innertube player response, reduced to what caption lookup needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// "asr" for auto-generated tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// Timed-text URL in the plain `<transcript>` format
    fn document_url(&self) -> String {
        self.base_url.replace("&fmt=srv3", "")
    }
}

/// Transcript provider backed by YouTube's own caption tracks
pub struct YoutubeTranscriptApi {
    client: Client,
    accept_language: String,
}

impl YoutubeTranscriptApi {
    pub fn new(timeout: Duration, accept_language: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            accept_language: accept_language.into(),
        })
    }

    /// Watch page HTML, getting past the cookie consent page if YouTube shows one
    async fn fetch_video_html(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let html = self.fetch_watch_page(video_id, None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Accepting consent page for {}", video_id);
        let consent_value = consent_value_regex()
            .captures(&html)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(FetchError::ConsentRequired)?;

        let cookie = format!("CONSENT=YES+{}", consent_value);
        let html = self.fetch_watch_page(video_id, Some(&cookie)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(FetchError::ConsentRequired);
        }

        Ok(html)
    }

    async fn fetch_watch_page(
        &self,
        video_id: &VideoId,
        cookie: Option<&str>,
    ) -> Result<String, FetchError> {
        let url = Url::parse_with_params(WATCH_URL, &[("v", video_id.as_str())])
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str());
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }

    /// Innertube player data for the video
    async fn fetch_player_response(
        &self,
        video_id: &VideoId,
        api_key: &str,
    ) -> Result<PlayerResponse, FetchError> {
        let url = Url::parse_with_params(INNERTUBE_PLAYER_URL, &[("key", api_key)])
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id.as_str(),
        });

        let response = self
            .client
            .post(url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response)?.json::<PlayerResponse>().await?)
    }

    async fn fetch_document(&self, track: &CaptionTrack) -> Result<String, FetchError> {
        let response = self
            .client
            .get(track.document_url())
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await?;

        Ok(check_status(response)?.text().await?)
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptApi {
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError> {
        tracing::debug!("Fetching watch page for {}", video_id);
        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_api_key(&html)?;

        let player = self.fetch_player_response(video_id, &api_key).await?;
        let tracks = caption_tracks(video_id, player)?;
        let track = select_track(video_id, &tracks, languages)?;

        tracing::debug!(
            "Using {} {} captions for {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code,
            video_id
        );
        let document = self.fetch_document(track).await?;
        parse_timedtext(&document)
    }
}

/// Treat rate limiting as blocking and any other non-success status as a failed request
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RequestBlocked);
    }
    Ok(response.error_for_status()?)
}

fn extract_api_key(html: &str) -> Result<String, FetchError> {
    if let Some(captures) = api_key_regex().captures(html) {
        return Ok(captures[1].to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        Err(FetchError::RequestBlocked)
    } else {
        Err(FetchError::InvalidResponse(
            "watch page has no innertube API key".to_string(),
        ))
    }
}

/// Check the video is playable and return its caption tracks
fn caption_tracks(
    video_id: &VideoId,
    player: PlayerResponse,
) -> Result<Vec<CaptionTrack>, FetchError> {
    if let Some(playability) = player.playability_status {
        let status = playability.status.as_deref().unwrap_or("OK");
        let reason = playability.reason.unwrap_or_default();

        match status {
            "OK" => {}
            "ERROR" if reason == UNAVAILABLE_REASON => {
                return Err(FetchError::VideoUnavailable(video_id.clone()));
            }
            "LOGIN_REQUIRED" if reason == BOT_CHECK_REASON => {
                return Err(FetchError::RequestBlocked);
            }
            "LOGIN_REQUIRED" if reason == AGE_GATE_REASON => {
                return Err(FetchError::AgeRestricted(video_id.clone()));
            }
            _ => {
                return Err(FetchError::VideoUnplayable {
                    video_id: video_id.clone(),
                    reason,
                });
            }
        }
    }

    let tracks = player
        .captions
        .and_then(|captions| captions.tracklist)
        .map(|tracklist| tracklist.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(FetchError::TranscriptsDisabled(video_id.clone()));
    }

    Ok(tracks)
}

/// First requested language that has a track; manual tracks win over generated ones
fn select_track<'a>(
    video_id: &VideoId,
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Result<&'a CaptionTrack, FetchError> {
    languages
        .iter()
        .find_map(|language| {
            let mut candidates = tracks
                .iter()
                .filter(|track| &track.language_code == language);
            let manual = candidates.clone().find(|track| !track.is_generated());
            manual.or_else(|| candidates.next())
        })
        .ok_or_else(|| FetchError::NoTranscriptFound {
            video_id: video_id.clone(),
            requested: languages.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoId {
        VideoId::from("dQw4w9WgXcQ")
    }

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "hi".to_string()]
    }

    fn player(json: serde_json::Value) -> PlayerResponse {
        serde_json::from_value(json).unwrap()
    }

    fn tracks(json: serde_json::Value) -> Vec<CaptionTrack> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSy-abc_123","OTHER":1})</script>"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSy-abc_123");
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            extract_api_key(r#"<div class="g-recaptcha"></div>"#),
            Err(FetchError::RequestBlocked)
        ));
        assert!(matches!(
            extract_api_key("<html></html>"),
            Err(FetchError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_unavailable_video() {
        let response = player(serde_json::json!({
            "playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}
        }));
        assert!(matches!(
            caption_tracks(&video(), response),
            Err(FetchError::VideoUnavailable(_))
        ));
    }

    #[test]
    fn test_login_required() {
        let bot_check = player(serde_json::json!({
            "playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": BOT_CHECK_REASON}
        }));
        assert!(matches!(
            caption_tracks(&video(), bot_check),
            Err(FetchError::RequestBlocked)
        ));

        let age_gate = player(serde_json::json!({
            "playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": AGE_GATE_REASON}
        }));
        assert!(matches!(
            caption_tracks(&video(), age_gate),
            Err(FetchError::AgeRestricted(_))
        ));
    }

    #[test]
    fn test_other_playability_errors() {
        let response = player(serde_json::json!({
            "playabilityStatus": {"status": "UNPLAYABLE", "reason": "Private video"}
        }));
        match caption_tracks(&video(), response) {
            Err(FetchError::VideoUnplayable { reason, .. }) => assert_eq!(reason, "Private video"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        let no_captions = player(serde_json::json!({"playabilityStatus": {"status": "OK"}}));
        assert!(matches!(
            caption_tracks(&video(), no_captions),
            Err(FetchError::TranscriptsDisabled(_))
        ));

        let no_tracks = player(serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {}}
        }));
        assert!(matches!(
            caption_tracks(&video(), no_tracks),
            Err(FetchError::TranscriptsDisabled(_))
        ));
    }

    #[test]
    fn test_caption_tracks_parsed() {
        let response = player(serde_json::json!({
            "playabilityStatus": {"status": "OK"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=en&fmt=srv3", "languageCode": "en"}
            ]}}
        }));
        let tracks = caption_tracks(&video(), response).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(
            tracks[0].document_url(),
            "https://www.youtube.com/api/timedtext?v=x&lang=en"
        );
    }

    #[test]
    fn test_select_prefers_language_order() {
        let tracks = tracks(serde_json::json!([
            {"baseUrl": "hi-manual", "languageCode": "hi"},
            {"baseUrl": "en-asr", "languageCode": "en", "kind": "asr"}
        ]));
        let track = select_track(&video(), &tracks, &languages()).unwrap();
        assert_eq!(track.base_url, "en-asr");
    }

    #[test]
    fn test_select_prefers_manual_tracks() {
        let tracks = tracks(serde_json::json!([
            {"baseUrl": "en-asr", "languageCode": "en", "kind": "asr"},
            {"baseUrl": "en-manual", "languageCode": "en"}
        ]));
        let track = select_track(&video(), &tracks, &languages()).unwrap();
        assert_eq!(track.base_url, "en-manual");
    }

    #[test]
    fn test_select_falls_back_to_hindi() {
        let tracks = tracks(serde_json::json!([
            {"baseUrl": "de", "languageCode": "de"},
            {"baseUrl": "hi-asr", "languageCode": "hi", "kind": "asr"}
        ]));
        let track = select_track(&video(), &tracks, &languages()).unwrap();
        assert_eq!(track.base_url, "hi-asr");
    }

    #[test]
    fn test_select_without_match() {
        let tracks = tracks(serde_json::json!([{"baseUrl": "de", "languageCode": "de"}]));
        match select_track(&video(), &tracks, &languages()) {
            Err(FetchError::NoTranscriptFound { requested, .. }) => {
                assert_eq!(requested, languages())
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
