//! DMA channel abstractions
//!
//! A [`ChannelConfig`] is a plain value describing how a channel moves
//! data; it carries no hardware handle. The traits describe the two
//! streaming roles a claimed channel plays on the link.

/// Direction of a streaming channel relative to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamDirection {
    /// Memory to encoder FIFO
    Transmit,
    /// Decoder FIFO to memory
    Receive,
}

/// Size of a single bus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferWidth {
    Byte,
    HalfWord,
    Word,
}

impl TransferWidth {
    /// Number of bytes moved per transfer
    pub const fn bytes(self) -> usize {
        match self {
            TransferWidth::Byte => 1,
            TransferWidth::HalfWord => 2,
            TransferWidth::Word => 4,
        }
    }
}

/// Which of the channel's two addresses is confined to the wrap region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingSide {
    Read,
    Write,
}

/// Address wrap applied to one side of a channel
///
/// The incrementing address only changes its low `size_bits` bits, so the
/// buffer must be aligned to `1 << size_bits` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingWrap {
    pub side: RingSide,
    pub size_bits: u8,
}

impl RingWrap {
    /// Size of the wrap region in bytes
    pub const fn size_bytes(&self) -> usize {
        1 << self.size_bits
    }

    /// Check whether `len` bytes starting at `addr` stay inside one wrap region
    pub const fn contains(&self, addr: usize, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let mask = !(self.size_bytes() - 1);
        (addr & mask) == ((addr + len - 1) & mask)
    }
}

/// Data request line that paces a channel
///
/// Numbering is chip specific; see the chip HAL for helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dreq(pub u8);

/// Complete description of a streaming channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Bus transfer size
    pub width: TransferWidth,
    /// Increment the read address after each transfer
    pub read_increment: bool,
    /// Increment the write address after each transfer
    pub write_increment: bool,
    /// Optional address wrap
    pub ring: Option<RingWrap>,
    /// Pacing request line
    pub dreq: Dreq,
}

/// Transmit-side channel
///
/// One transfer at a time; the caller holds `&mut self` for the whole
/// transfer, which is what serializes sends.
pub trait TxChannel {
    /// Error type for transfer operations
    type Error;

    /// A trigger is outstanding: the hardware is still moving words or
    /// its completion has not been accounted yet
    ///
    /// Non-blocking. A new transfer must not be started while this holds.
    fn is_busy(&self) -> bool;

    /// Point the channel at `words`, trigger it, and resolve once every
    /// word has been accepted by the encoder FIFO
    ///
    /// The wait is bounded by the line bit rate and `words.len()`; it has
    /// no timeout of its own.
    fn transfer(&mut self, words: &[u32]) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Receive-side channel writing a capture ring
///
/// The completion interrupt owns re-arming. Consumers start the channel
/// once and afterwards only wait for completed blocks.
pub trait CaptureChannel {
    /// Start the first capture block
    fn arm(&mut self);

    /// Resolve once the cumulative completed-block count differs from
    /// `seen`, returning the new count
    ///
    /// The count wraps at `u32::MAX`.
    fn wait_blocks(&mut self, seen: u32) -> impl core::future::Future<Output = u32>;

    /// Cumulative completed-block count right now, without waiting
    ///
    /// Block `n` stays intact in the ring only while this is below
    /// `n + chunks_per_ring`.
    fn completed(&self) -> u32;

    /// Copy `out.len()` words out of the ring starting at word `start`
    fn read_words(&self, start: usize, out: &mut [u32]);
}
