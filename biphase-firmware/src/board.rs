//! Board wiring
//!
//! The DMA request lines and FIFO addresses follow the configured PIO
//! block and state machines, but peripheral ownership is static, so the
//! configuration must name the pins and state machines this board hands
//! out below. A mismatch fails the build.

use biphase_core::LinkConfig;
use biphase_hal_rp2040::CYCLES_PER_BIT;

include!(concat!(env!("OUT_DIR"), "/link_config.rs"));

const _: () = assert!(LINK_CONFIG.pio == 0, "board uses PIO0");
const _: () = assert!(LINK_CONFIG.tx_sm == 0 && LINK_CONFIG.rx_sm == 1, "board uses sm0 (tx) and sm1 (rx)");
const _: () = assert!(LINK_CONFIG.tx_pin == 14 && LINK_CONFIG.rx_pin == 15, "board uses GPIO14 (tx) and GPIO15 (rx)");
const _: () = assert!(LINK_CONFIG.cycles_per_bit == CYCLES_PER_BIT, "line programs use 16 cycles per bit");

/// USB identity
pub const USB_VID: u16 = 0xCAFE;
pub const USB_PID: u16 = 0x4004;
pub const USB_MANUFACTURER: &str = "Biphase";
pub const USB_PRODUCT: &str = "USB HID to Differential Manchester bridge";
pub const USB_SERIAL: &str = "000001";

/// HID interrupt endpoint polling interval
pub const HID_POLL_MS: u8 = 1;
