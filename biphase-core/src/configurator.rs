//! DMA channel configuration for each stream direction
//!
//! Both directions move one word per transfer, increment only on the
//! memory side, wrap the memory-side address inside the buffer, and are
//! paced by the FIFO's data request so the channel never outruns the
//! line coder.

use biphase_hal::dma::{ChannelConfig, Dreq, RingSide, RingWrap, StreamDirection, TransferWidth};

use crate::config::ConfigError;

/// Largest wrap region the channel control field can express (32 KiB)
pub const MAX_RING_BITS: u8 = 15;

/// Convert a ring size in bytes to its wrap bit count
pub fn ring_bits(ring_bytes: usize) -> Result<u8, ConfigError> {
    if !ring_bytes.is_power_of_two() {
        return Err(ConfigError::RingNotPowerOfTwo);
    }
    if ring_bytes < TransferWidth::Word.bytes() {
        return Err(ConfigError::RingTooSmall);
    }
    let bits = ring_bytes.trailing_zeros() as u8;
    if bits > MAX_RING_BITS {
        return Err(ConfigError::RingTooLarge);
    }
    Ok(bits)
}

/// Build the channel configuration for one direction
///
/// `ring_bytes` is the byte length of the memory-side buffer and must be
/// a power of two. Nothing is claimed or started.
pub fn channel_config(
    direction: StreamDirection,
    ring_bytes: usize,
    dreq: Dreq,
) -> Result<ChannelConfig, ConfigError> {
    let size_bits = ring_bits(ring_bytes)?;

    let (read_increment, write_increment, side) = match direction {
        StreamDirection::Transmit => (true, false, RingSide::Read),
        StreamDirection::Receive => (false, true, RingSide::Write),
    };

    Ok(ChannelConfig {
        width: TransferWidth::Word,
        read_increment,
        write_increment,
        ring: Some(RingWrap { side, size_bits }),
        dreq,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::CAPTURE_BYTES;

    #[test]
    fn test_ring_bits() {
        assert_eq!(ring_bits(1024), Ok(10));
        assert_eq!(ring_bits(4), Ok(2));
        assert_eq!(ring_bits(32 * 1024), Ok(15));
        assert_eq!(ring_bits(64 * 1024), Err(ConfigError::RingTooLarge));
        assert_eq!(ring_bits(1000), Err(ConfigError::RingNotPowerOfTwo));
        assert_eq!(ring_bits(0), Err(ConfigError::RingNotPowerOfTwo));
        assert_eq!(ring_bits(2), Err(ConfigError::RingTooSmall));
    }

    #[test]
    fn test_transmit_config() {
        let config = channel_config(StreamDirection::Transmit, CAPTURE_BYTES, Dreq(0)).unwrap();
        assert_eq!(config.width, TransferWidth::Word);
        assert!(config.read_increment);
        assert!(!config.write_increment);
        assert_eq!(
            config.ring,
            Some(RingWrap {
                side: RingSide::Read,
                size_bits: 10
            })
        );
        assert_eq!(config.dreq, Dreq(0));
    }

    #[test]
    fn test_receive_config() {
        let config = channel_config(StreamDirection::Receive, CAPTURE_BYTES, Dreq(5)).unwrap();
        assert!(!config.read_increment);
        assert!(config.write_increment);
        let ring = config.ring.unwrap();
        assert_eq!(ring.side, RingSide::Write);
        assert_eq!(ring.size_bytes(), CAPTURE_BYTES);
        assert_eq!(config.dreq, Dreq(5));
    }

    #[test]
    fn test_rejects_odd_ring() {
        assert_eq!(
            channel_config(StreamDirection::Receive, 768, Dreq(5)),
            Err(ConfigError::RingNotPowerOfTwo)
        );
    }
}
