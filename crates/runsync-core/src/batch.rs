//! Order-preserving chunking of result sequences.

use std::num::NonZeroUsize;

/// Maximum number of results submitted in one `add_results` call.
pub const RESULTS_BATCH_SIZE: usize = 1000;

const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(RESULTS_BATCH_SIZE) {
    Some(size) => size,
    None => panic!("RESULTS_BATCH_SIZE must be non-zero"),
};

/// One chunk of a larger sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a, T> {
    /// Zero-based chunk number.
    pub index: usize,
    /// Position of the first item of the chunk in the full sequence.
    pub offset: usize,
    pub items: &'a [T],
}

/// Splits a slice into chunks of at most `size` items.
///
/// Chunk `k` holds indices `[k * size, min((k + 1) * size, len))`.
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    size: NonZeroUsize,
}

impl Batcher {
    pub fn new(size: NonZeroUsize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Number of chunks `len` items produce.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.size.get())
    }

    pub fn batches<'a, T>(&self, items: &'a [T]) -> impl Iterator<Item = Batch<'a, T>> + 'a {
        let size = self.size.get();
        items
            .chunks(size)
            .enumerate()
            .map(move |(index, items)| Batch {
                index,
                offset: index * size,
                items,
            })
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
