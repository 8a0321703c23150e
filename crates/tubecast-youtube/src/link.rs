// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Video id extraction from YouTube links.

use std::sync::LazyLock;

use regex::Regex;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/watch\?v=|youtu\.be/)(?<id>[^?&#\s]+)")
        .expect("valid regex")
});

/// Returns the video id of the first YouTube link in `text`.
///
/// Accepts `youtube.com/watch?v=<id>` and `youtu.be/<id>`, with or without
/// scheme and `www.`; the id ends at `?`, `&`, `#` or whitespace.
pub fn extract_video_id(text: &str) -> Option<&str> {
    LINK_RE
        .captures(text)
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_forms() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=n78Gg6_zEQg"),
            Some("n78Gg6_zEQg")
        );
        assert_eq!(extract_video_id("https://youtu.be/n78Gg6_zEQg"), Some("n78Gg6_zEQg"));
        assert_eq!(extract_video_id("youtu.be/abc"), Some("abc"));
        assert_eq!(
            extract_video_id("http://m.youtube.com/watch?v=abc"),
            Some("abc")
        );
    }

    #[test]
    fn id_stops_at_query_and_whitespace() {
        assert_eq!(
            extract_video_id("youtube.com/watch?v=abc&t=42"),
            Some("abc")
        );
        assert_eq!(extract_video_id("youtu.be/abc?si=xyz"), Some("abc"));
        assert_eq!(
            extract_video_id("listen to this youtu.be/abc please"),
            Some("abc")
        );
    }

    #[test]
    fn non_links_are_ignored() {
        assert_eq!(extract_video_id("hello there"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123"), None);
        assert_eq!(extract_video_id("youtube.com/channel/xyz"), None);
    }
}
