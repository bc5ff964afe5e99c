//! Capture ring geometry
//!
//! The receive channel writes a 256-word ring whose address range is a
//! power-of-two wrap region. Each DMA block is one chunk of 16 words,
//! which is also one outbound report.

use biphase_protocol::{REPORT_LEN, WORD_LEN};

/// Capacity of the capture ring in words
pub const CAPTURE_WORDS: usize = 256;

/// Capacity of the capture ring in bytes (also its required alignment)
pub const CAPTURE_BYTES: usize = CAPTURE_WORDS * WORD_LEN;

/// Words per chunk (one DMA block, one report)
pub const CHUNK_WORDS: usize = 16;

/// Bytes per chunk
pub const CHUNK_BYTES: usize = CHUNK_WORDS * WORD_LEN;

/// Chunks in one full traversal of the ring
pub const CHUNKS_PER_RING: usize = CAPTURE_WORDS / CHUNK_WORDS;

const _: () = assert!(CAPTURE_WORDS.is_power_of_two());
const _: () = assert!(CAPTURE_WORDS % CHUNK_WORDS == 0);
const _: () = assert!(CHUNK_BYTES == REPORT_LEN);

/// Position of the next unforwarded chunk, in words
///
/// Only the capture loop owns and advances this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotationOffset(usize);

impl RotationOffset {
    /// Offset of the first chunk
    pub const fn new() -> Self {
        Self(0)
    }

    /// Offset of the slot that block number `block` lands in
    pub const fn at_block(block: u32) -> Self {
        Self((block as usize % CHUNKS_PER_RING) * CHUNK_WORDS)
    }

    /// Word index into the ring
    pub const fn word_index(self) -> usize {
        self.0
    }

    /// Chunk index into the ring
    pub const fn chunk_index(self) -> usize {
        self.0 / CHUNK_WORDS
    }

    /// Byte offset from the ring base
    pub const fn byte_offset(self) -> usize {
        self.0 * WORD_LEN
    }

    /// Move to the next chunk, wrapping at the end of the ring
    pub fn advance(&mut self) {
        self.0 = (self.0 + CHUNK_WORDS) % CAPTURE_WORDS;
    }
}
