//! In-process flat similarity index with brute-force cosine search.

use super::document::Document;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity score (higher = better).
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl FlatIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        Self {
            entries,
            dimensions,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Top `limit` entries by cosine similarity, ties kept in insertion order.
    pub fn search(&self, query: &[f32], limit: usize, min_score: Option<f32>) -> Vec<ScoredDocument> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(query, &entry.embedding)))
            .filter(|(_, score)| min_score.map(|min| *score >= min).unwrap_or(true))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(idx, score)| ScoredDocument {
                document: self.entries[idx].document.clone(),
                score,
            })
            .collect()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
