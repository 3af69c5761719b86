//! Encoding text buffer
//!
//! Positions, ranges and the lookups the viewer performs on the MEI source
//! held by the editor component.
//!
//! ## Modules
//!
//! - `cursor`: buffer positions and ranges
//! - `buffer`: the `TextEditor` seam and the in-memory `EncodingBuffer`

pub mod buffer;
pub mod cursor;

// Re-exports for convenience
pub use buffer::{EncodingBuffer, TextEditor};
pub use cursor::{BufferPos, BufferRange};
