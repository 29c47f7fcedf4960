//! Fixed-window character splitter.
//!
//! Windows are `chunk_size` characters wide and advance by
//! `chunk_size - chunk_overlap`, so consecutive chunks share `chunk_overlap`
//! characters. The last window ends exactly at the end of the text.

use super::document::Document;

#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`; a zero size is treated as one.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Character windows of `text` with their start offsets.
    pub fn split_text(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();
        let mut chunks = Vec::new();

        if total_chars == 0 {
            return chunks;
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(total_chars);
            chunks.push((start, chars[start..end].iter().collect()));
            if end == total_chars {
                break;
            }
            start += step;
        }

        chunks
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(chunk_index, (start, text))| doc.derive_chunk(text, start, chunk_index))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_count(len: usize, size: usize, overlap: usize) -> usize {
        if len == 0 {
            0
        } else if len <= size {
            1
        } else {
            (len - overlap).div_ceil(size - overlap)
        }
    }

    #[test]
    fn chunk_count_follows_window_formula() {
        let splitter = TextSplitter::new(500, 50);
        for len in [0, 1, 499, 500, 501, 950, 951, 1400, 1401, 5000, 12345] {
            let text = "a".repeat(len);
            assert_eq!(
                splitter.split_text(&text).len(),
                expected_count(len, 500, 50),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let splitter = TextSplitter::new(10, 3);
        let text: String = ('a'..='z').collect();
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks[0], (0, "abcdefghij".to_string()));
        assert_eq!(chunks[1], (7, "hijklmnopq".to_string()));
        for pair in chunks.windows(2) {
            let prev_tail: String = pair[0].1.chars().rev().take(3).collect::<Vec<_>>().into_iter().rev().collect();
            let next_head: String = pair[1].1.chars().take(3).collect();
            assert_eq!(prev_tail, next_head);
        }
        assert!(chunks.last().unwrap().1.ends_with('z'));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let splitter = TextSplitter::new(4, 1);
        let chunks = splitter.split_text("こんにちは世界です");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].1, "こんにち");
    }

    #[test]
    fn split_documents_keeps_source_and_positions() {
        let splitter = TextSplitter::new(5, 1);
        let docs = vec![
            Document::new("0123456789", "a.txt").with_title(Some("A".to_string())),
            Document::new("", "empty.txt"),
        ];

        let chunks = splitter.split_documents(&docs);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.source() == "a.txt"));
        assert_eq!(chunks[1].metadata.start_index, Some(4));
        assert_eq!(chunks[2].metadata.chunk_index, Some(2));
        assert_eq!(chunks[0].metadata.title.as_deref(), Some("A"));
    }

    #[test]
    fn overlap_is_clamped_below_size() {
        let splitter = TextSplitter::new(3, 10);
        assert_eq!(splitter.chunk_overlap(), 2);
        assert_eq!(splitter.split_text("abcdef").len(), 4);
    }
}
