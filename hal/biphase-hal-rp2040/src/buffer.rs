//! Ring-aligned DMA buffers
//!
//! A channel's ring wrap only rewrites the low address bits, so every
//! buffer a wrapping channel touches is aligned to its own size.

use core::cell::UnsafeCell;
use core::ptr;

use biphase_core::ring::{CAPTURE_BYTES, CAPTURE_WORDS};

/// Byte size of the transmit channel's read-side wrap region
pub const TX_RING_BYTES: usize = CAPTURE_BYTES;

/// Receive ring written by DMA and read by the capture loop
#[repr(C, align(1024))]
pub struct CaptureBuffer(UnsafeCell<[u32; CAPTURE_WORDS]>);

const _: () = assert!(core::mem::align_of::<CaptureBuffer>() == CAPTURE_BYTES);
const _: () = assert!(core::mem::size_of::<CaptureBuffer>() == CAPTURE_BYTES);

// SAFETY: the only writer is the DMA engine; the CPU only performs
// volatile word reads, which cannot tear on this bus.
unsafe impl Sync for CaptureBuffer {}

impl CaptureBuffer {
    pub const fn new() -> Self {
        Self(UnsafeCell::new([0; CAPTURE_WORDS]))
    }

    /// Base address for the channel's write pointer
    pub fn base(&self) -> *mut u32 {
        self.0.get().cast()
    }

    /// Copy words out of the ring, wrapping at the end
    pub fn read_words(&self, start: usize, out: &mut [u32]) {
        let base = self.base();
        for (i, word) in out.iter_mut().enumerate() {
            let index = (start + i) % CAPTURE_WORDS;
            // SAFETY: index is inside the ring; DMA may be writing other
            // words concurrently, hence volatile.
            *word = unsafe { ptr::read_volatile(base.add(index)) };
        }
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Transmit source aligned to the transmit ring
///
/// Payloads read from the host into this buffer never straddle a wrap
/// boundary, so the channel reads them flat.
#[repr(C, align(1024))]
pub struct TxSourceBuffer(pub [u8; TX_RING_BYTES]);

const _: () = assert!(core::mem::align_of::<TxSourceBuffer>() == TX_RING_BYTES);

impl TxSourceBuffer {
    pub const fn zeroed() -> Self {
        Self([0; TX_RING_BYTES])
    }

    /// Byte `i` equals `i mod 256`
    pub const fn counting() -> Self {
        let mut bytes = [0u8; TX_RING_BYTES];
        let mut i = 0;
        while i < TX_RING_BYTES {
            bytes[i] = i as u8;
            i += 1;
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Initial read source of the transmit channel and the boot self-test
pub static SELF_TEST_PATTERN: TxSourceBuffer = TxSourceBuffer::counting();
