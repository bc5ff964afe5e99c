//! Inter-task communication channels
//!
//! Statics shared between the two cores and the DMA interrupt.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use biphase_core::UsbStatus;
use biphase_hal_rp2040::DmaContext;
use biphase_protocol::REPORT_LEN;

/// Captured chunks queued between the core1 capture loop and the HID IN
/// writer; half a capture ring
const CHUNK_CHANNEL_SIZE: usize = 8;

/// One captured chunk, sent to the host as one input report
pub type Chunk = [u8; REPORT_LEN];

/// Captured chunks from core1 to the HID IN endpoint
pub static CHUNK_CHANNEL: Channel<CriticalSectionRawMutex, Chunk, CHUNK_CHANNEL_SIZE> =
    Channel::new();

/// USB device status changes for the LED task
pub static USB_STATUS: Signal<CriticalSectionRawMutex, UsbStatus> = Signal::new();

/// Stream channel state shared with the `DMA_IRQ_1` handler
pub static DMA_CONTEXT: DmaContext = DmaContext::new();
