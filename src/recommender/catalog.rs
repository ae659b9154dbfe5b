use std::fs;
use std::path::Path;

use tracing::info;

use super::{RecommendError, RecommendationRecord};

/// In-memory song dataset, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    songs: Vec<RecommendationRecord>,
}

impl SongCatalog {
    pub fn new(songs: Vec<RecommendationRecord>) -> Self {
        Self { songs }
    }

    /// Load a JSON array of `{artist, song, link, text}` objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecommendError> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        let raw = fs::read_to_string(path).map_err(|source| RecommendError::Io {
            path: path_display.clone(),
            source,
        })?;
        let songs: Vec<RecommendationRecord> =
            serde_json::from_str(&raw).map_err(|source| RecommendError::Parse {
                path: path_display.clone(),
                source,
            })?;

        info!(path = %path_display, songs = songs.len(), "song catalogue loaded");
        Ok(Self::new(songs))
    }

    pub fn songs(&self) -> &[RecommendationRecord] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Index of the first song whose title matches `name`, ignoring case and
    /// surrounding whitespace.
    pub fn position(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.songs
            .iter()
            .position(|s| s.song.trim().to_lowercase() == needle)
    }

    /// Deduplicated, alphabetically sorted titles. Blank titles are skipped.
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .songs
            .iter()
            .map(|s| s.song.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        titles.sort();
        titles.dedup();
        titles
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn record(artist: &str, song: &str) -> RecommendationRecord {
        RecommendationRecord {
            artist: artist.to_string(),
            song: song.to_string(),
            link: None,
            text: None,
        }
    }

    #[test]
    fn titles_are_sorted_and_deduplicated() {
        let catalog = SongCatalog::new(vec![
            record("B", "Yesterday"),
            record("A", "Angie"),
            record("C", "Yesterday"),
            record("D", "  "),
        ]);
        assert_eq!(catalog.titles(), vec!["Angie", "Yesterday"]);
    }

    #[test]
    fn position_ignores_case_and_whitespace() {
        let catalog = SongCatalog::new(vec![record("A", "Angie"), record("B", "Yesterday")]);
        assert_eq!(catalog.position("  yesterday "), Some(1));
        assert_eq!(catalog.position("YESTERDAY"), Some(1));
        assert_eq!(catalog.position("Tomorrow"), None);
        assert_eq!(catalog.position(""), None);
    }

    #[test]
    fn load_reads_json_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"artist": "ABBA", "song": "Angie", "link": "/a/angie.html", "text": "la la"}},
                {{"artist": "Queen", "song": "Bicycle"}}]"#
        )
        .unwrap();

        let catalog = SongCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.songs()[0].link.as_deref(), Some("/a/angie.html"));
        assert_eq!(catalog.songs()[1].text, None);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let err = SongCatalog::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RecommendError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SongCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, RecommendError::Parse { .. }));
    }
}
