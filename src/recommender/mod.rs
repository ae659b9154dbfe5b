pub mod catalog;
pub mod tfidf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::SongCatalog;
pub use tfidf::TfidfRecommender;

/// Number of recommendations the chat agent asks for.
pub const DEFAULT_TOP_N: usize = 5;

/// A song returned by the similarity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub artist: String,
    pub song: String,
    #[serde(default)]
    pub link: Option<String>,
    /// Lyrics excerpt.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("failed to read song dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed song dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Lyrics similarity lookup.
///
/// `recommend` returns `Ok(None)` when `song_name` is not in the catalogue.
/// Results are ordered most similar first and never contain the queried song.
pub trait SongRecommender: Send + Sync {
    fn recommend(
        &self,
        song_name: &str,
        top_n: usize,
    ) -> Result<Option<Vec<RecommendationRecord>>, RecommendError>;

    /// Every known song title, deduplicated and sorted.
    fn song_titles(&self) -> Result<Vec<String>, RecommendError>;
}
