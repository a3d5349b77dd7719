use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const LIVE_CHAT_ENDPOINT: &str = "https://www.youtube.com/live_chat";
pub const BLANK_SOURCE: &str = "about:blank";
pub const VIDEO_ID_LEN: usize = 11;

static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*((youtu.be/)|(v/)|(/u/\w/)|(embed/)|(watch\?)|(live/))\??v?=?([^#&?]*).*")
        .expect("valid video url regex")
});

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"));

/// Extracts the fixed-length video identifier from a page URL. Returns
/// `None` for anything that is not a watch/live/embed/short-link page.
pub fn extract_video_id(url: &str) -> Option<String> {
    let captures = VIDEO_URL_RE.captures(url)?;
    let candidate = captures.get(8)?.as_str();
    if candidate.len() != VIDEO_ID_LEN || !VIDEO_ID_RE.is_match(candidate) {
        tracing::trace!(url, "no video id in location");
        return None;
    }
    Some(candidate.to_string())
}

pub fn is_video_page(url: &str) -> bool {
    extract_video_id(url).is_some()
}

pub fn live_chat_url(video_id: &str) -> String {
    format!("{LIVE_CHAT_ENDPOINT}?v={video_id}")
}

/// Source used when liveness could not be determined. Carries the embedding
/// page's host so the chat endpoint accepts the frame.
pub fn fallback_chat_url(video_id: &str, page_url: &str) -> String {
    match Url::parse(page_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        Some(host) => format!("{LIVE_CHAT_ENDPOINT}?v={video_id}&embed_domain={host}"),
        None => live_chat_url(video_id),
    }
}
