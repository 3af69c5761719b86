//! Buffer positions and ranges
//!
//! Rows and columns are zero-based; columns count characters. Browser
//! editors count UTF-16 code units instead, see
//! [`EncodingBuffer::utf16_column`](super::EncodingBuffer::utf16_column).

use serde::{Deserialize, Serialize};

/// A position in the encoding buffer (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct BufferPos {
    pub row: usize,
    pub column: usize,
}

impl BufferPos {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A range of text from start (inclusive) to end (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRange {
    pub start: BufferPos,
    pub end: BufferPos,
}

impl BufferRange {
    pub fn new(start: BufferPos, end: BufferPos) -> Self {
        Self { start, end }
    }
}
