use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, info};

use super::{RecommendError, RecommendationRecord, SongCatalog, SongRecommender};

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "don", "down", "for", "from", "had", "has", "have", "he", "her", "here", "hers",
    "him", "his", "how", "if", "in", "into", "is", "it", "its", "just", "ll", "me", "my", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "our", "out", "over", "re",
    "she", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "up", "us", "ve", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "why", "will", "with",
    "would", "you", "your", "yours",
];

/// Sparse document vector: `(term id, weight)` pairs sorted by term id.
type SparseVector = Vec<(usize, f32)>;

/// Lyrics similarity over TF-IDF vectors with cosine ranking.
pub struct TfidfRecommender {
    catalog: SongCatalog,
    vectors: Vec<SparseVector>,
}

impl TfidfRecommender {
    pub fn new(catalog: SongCatalog) -> Self {
        let documents: Vec<Vec<String>> = catalog
            .songs()
            .iter()
            .map(|s| tokenize(s.text.as_deref().unwrap_or("")))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        let mut term_counts: Vec<HashMap<usize, usize>> = Vec::with_capacity(documents.len());

        for tokens in &documents {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for token in tokens {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(token.clone()).or_insert(next_id);
                if id == document_frequency.len() {
                    document_frequency.push(0);
                }
                *counts.entry(id).or_insert(0) += 1;
            }
            for id in counts.keys() {
                document_frequency[*id] += 1;
            }
            term_counts.push(counts);
        }

        let n = documents.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();

        let vectors = term_counts
            .into_iter()
            .map(|counts| {
                let mut vector: SparseVector = counts
                    .into_iter()
                    .map(|(id, count)| (id, count as f32 * idf[id]))
                    .collect();
                vector.sort_unstable_by_key(|(id, _)| *id);
                normalize(&mut vector);
                vector
            })
            .collect();

        info!(
            songs = catalog.len(),
            vocabulary = vocabulary.len(),
            "tf-idf index built"
        );

        Self { catalog, vectors }
    }
}

impl SongRecommender for TfidfRecommender {
    fn recommend(
        &self,
        song_name: &str,
        top_n: usize,
    ) -> Result<Option<Vec<RecommendationRecord>>, RecommendError> {
        let Some(query) = self.catalog.position(song_name) else {
            debug!(song = song_name, "song not in catalogue");
            return Ok(None);
        };

        let query_vector = &self.vectors[query];
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != query)
            .map(|(idx, vector)| (idx, dot(query_vector, vector)))
            .collect();

        // Stable sort: equal scores keep catalogue order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let songs = self.catalog.songs();
        let results = scored
            .into_iter()
            .take(top_n)
            .map(|(idx, _)| songs[idx].clone())
            .collect();

        Ok(Some(results))
    }

    fn song_titles(&self) -> Result<Vec<String>, RecommendError> {
        Ok(self.catalog.titles())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

fn normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two sparse vectors sorted by term id.
fn dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
