use std::sync::LazyLock;

use regex::Regex;

const RECOMMENDATION_KEYWORDS: &[&str] = &["recommend", "suggestion", "similar", "like"];

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("quoted-song pattern"));

static SIMILAR_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"similar to (.+?)(?:\?|\.|\n?$)").expect("similar-to pattern"));

/// What the agent should do with a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Look up songs similar to the named one.
    Recommend { song_name: String },
    /// Anything else goes to the model as-is.
    General,
}

/// Keyword heuristic; substring matches such as "likely" count too.
pub fn is_recommendation_request(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RECOMMENDATION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// First single- or double-quoted run in the original message.
pub fn quoted_song(message: &str) -> Option<String> {
    QUOTED
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `similar to <name>` on the lower-cased message, up to `?`, `.` or the end.
pub fn similar_to_song(message: &str) -> Option<String> {
    let lowered = message.to_lowercase();
    SIMILAR_TO
        .captures(&lowered)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Quoted names win over the "similar to" phrase.
pub fn detect(message: &str) -> Intent {
    if !is_recommendation_request(message) {
        return Intent::General;
    }

    match quoted_song(message).or_else(|| similar_to_song(message)) {
        Some(song_name) => Intent::Recommend { song_name },
        None => Intent::General,
    }
}
