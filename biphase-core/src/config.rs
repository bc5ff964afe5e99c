//! Link configuration
//!
//! Pin assignments, state machine indices and line bit rate. The
//! firmware build script reads these from `bridge.toml` and checks them
//! with [`LinkConfig::validate`] before anything is flashed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest usable GPIO number
pub const MAX_PIN: u8 = 29;

/// State machines per PIO block
pub const SM_PER_PIO: u8 = 4;

/// Number of PIO blocks
pub const PIO_BLOCKS: u8 = 2;

/// Default line bit rate (6 Mbps)
pub const DEFAULT_BIT_RATE_HZ: u32 = 6_000_000;

/// PIO cycles spent per line bit by both coding programs
pub const DEFAULT_CYCLES_PER_BIT: u32 = 16;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Configuration and channel setup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Ring size is not a power of two
    RingNotPowerOfTwo,
    /// Ring is larger than the hardware wrap field allows
    RingTooLarge,
    /// Ring is smaller than one transfer
    RingTooSmall,
    /// PIO block or state machine index out of range
    InvalidStateMachine,
    /// GPIO number out of range
    InvalidPin,
    /// Bit rate is zero or needs a divider outside 1.0..=65535.996
    InvalidBitRate,
    /// TX and RX share a pin or a state machine
    PinConflict,
}

/// Calculate the PIO clock divider for a line bit rate
///
/// The state machine runs at `sys_clk / divider` and spends
/// `cycles_per_bit` cycles per bit, so
/// `divider = sys_clk / (bit_rate * cycles_per_bit)`.
///
/// Returns (integer_part, fractional_part) for the 16.8 fixed-point
/// divider. The integer part saturates at 0xFFFF.
pub fn calc_clock_divider(sys_clk_hz: u32, bit_rate_hz: u32, cycles_per_bit: u32) -> (u16, u8) {
    let divisor = bit_rate_hz as u64 * cycles_per_bit as u64;
    if divisor == 0 {
        return (0xFFFF, 0xFF);
    }

    let divider_x256 = (sys_clk_hz as u64 * 256) / divisor;

    let int_part = (divider_x256 / 256).min(0xFFFF) as u16;
    let frac_part = (divider_x256 % 256) as u8;

    (int_part, frac_part)
}

/// Line and peripheral settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Encoder output pin
    pub tx_pin: u8,
    /// Decoder input pin
    pub rx_pin: u8,
    /// PIO block hosting both state machines
    pub pio: u8,
    /// Encoder state machine
    pub tx_sm: u8,
    /// Decoder state machine
    pub rx_sm: u8,
    /// Line bit rate in Hz
    pub bit_rate_hz: u32,
    /// PIO cycles per line bit
    pub cycles_per_bit: u32,
    /// System clock feeding the PIO
    pub sys_clk_hz: u32,
    /// Transmit the self-test pattern once at boot
    pub self_test_on_boot: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tx_pin: 14,
            rx_pin: 15,
            pio: 0,
            tx_sm: 0,
            rx_sm: 1,
            bit_rate_hz: DEFAULT_BIT_RATE_HZ,
            cycles_per_bit: DEFAULT_CYCLES_PER_BIT,
            sys_clk_hz: SYS_CLK_HZ,
            self_test_on_boot: false,
        }
    }
}

impl LinkConfig {
    /// Check ranges and conflicts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_pin > MAX_PIN || self.rx_pin > MAX_PIN {
            return Err(ConfigError::InvalidPin);
        }
        if self.pio >= PIO_BLOCKS || self.tx_sm >= SM_PER_PIO || self.rx_sm >= SM_PER_PIO {
            return Err(ConfigError::InvalidStateMachine);
        }
        if self.tx_pin == self.rx_pin || self.tx_sm == self.rx_sm {
            return Err(ConfigError::PinConflict);
        }
        if self.bit_rate_hz == 0 || self.cycles_per_bit == 0 {
            return Err(ConfigError::InvalidBitRate);
        }
        let (int_part, _) = self.clock_divider();
        if int_part == 0 {
            return Err(ConfigError::InvalidBitRate);
        }
        Ok(())
    }

    /// PIO clock divider for the configured bit rate
    pub fn clock_divider(&self) -> (u16, u8) {
        calc_clock_divider(self.sys_clk_hz, self.bit_rate_hz, self.cycles_per_bit)
    }

    /// Line time for `words` words in microseconds, rounded up
    ///
    /// This is the upper bound of a blocking transfer on an idle link.
    pub fn transfer_time_us(&self, words: usize) -> u64 {
        if self.bit_rate_hz == 0 {
            return u64::MAX;
        }
        let bits = words as u64 * 32;
        (bits * 1_000_000).div_ceil(self.bit_rate_hz as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(LinkConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_divider() {
        // 125 MHz / (16 * 6 MHz) = 1.302..., 0.302 * 256 = 77.3
        let (int_part, frac_part) = LinkConfig::default().clock_divider();
        assert_eq!(int_part, 1);
        assert_eq!(frac_part, 77);
    }

    #[test]
    fn test_zero_rate_divider_saturates() {
        assert_eq!(calc_clock_divider(SYS_CLK_HZ, 0, 16), (0xFFFF, 0xFF));
        assert_eq!(calc_clock_divider(SYS_CLK_HZ, 1, 1), (0xFFFF, 0));
    }

    #[test]
    fn test_slow_link_divider() {
        // 125 MHz / (16 * 115200) = 67.8
        let config = LinkConfig {
            bit_rate_hz: 115_200,
            ..Default::default()
        };
        let (int_part, _) = config.clock_divider();
        assert_eq!(int_part, 67);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_bit_rate_too_high() {
        // 125 MHz / (16 * 10 MHz) < 1.0
        let config = LinkConfig {
            bit_rate_hz: 10_000_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBitRate));

        let config = LinkConfig {
            bit_rate_hz: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBitRate));
    }

    #[test]
    fn test_conflicts() {
        let config = LinkConfig {
            rx_pin: 14,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PinConflict));

        let config = LinkConfig {
            rx_sm: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PinConflict));
    }

    #[test]
    fn test_ranges() {
        let config = LinkConfig {
            tx_pin: 30,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPin));

        let config = LinkConfig {
            rx_sm: 4,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidStateMachine));

        let config = LinkConfig {
            pio: 2,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidStateMachine));
    }

    #[test]
    fn test_transfer_time() {
        let config = LinkConfig::default();
        // 16 words = 512 bits at 6 Mbps = 85.3 us
        assert_eq!(config.transfer_time_us(16), 86);
        assert_eq!(config.transfer_time_us(0), 0);
    }
}
