//! Document splitting.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached later by the ingestion pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into chunks of at most `chunk_size` characters, with
/// `overlap` characters repeated between consecutive chunks.
///
/// With `overlap == 0` (the default policy) the concatenation of the chunks
/// reconstructs the input exactly. Chunk ids are `{document_id}_{index}` and
/// each chunk inherits the parent document's metadata plus a `chunk_index`
/// field. Splitting is char-boundary safe for any UTF-8 input.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a chunker with the given maximum size and overlap, in characters.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();
        if text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        // Byte offset of every char boundary, so slicing never lands inside
        // a multi-byte sequence.
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total_chars = bounds.len();
        let byte_at = |char_pos: usize| {
            if char_pos >= total_chars { text.len() } else { bounds[char_pos] }
        };

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;
        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let span = &text[byte_at(start)..byte_at(end)];

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), index.to_string());

            chunks.push(Chunk {
                id: format!("{}_{index}", document.id),
                text: span.to_string(),
                embedding: Vec::new(),
                metadata,
                document_id: document.id.clone(),
            });

            // Once a chunk reaches the end of the text, a further step would
            // only emit a suffix of it.
            if end == total_chars {
                break;
            }
            index += 1;
            let step = self.chunk_size.saturating_sub(self.overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}
