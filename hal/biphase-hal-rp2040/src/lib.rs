//! RP2040-specific HAL for the link bridge
//!
//! This crate provides RP2040 implementations of the `biphase-hal`
//! traits plus the chip-specific pieces of the link:
//!
//! - Raw DMA channel programming with ring wrap and PIO pacing
//! - Completion interrupt dispatch for both stream channels
//! - Ring-aligned capture and transmit buffers
//! - Differential Manchester (bi-phase mark) PIO encoder and decoder

#![no_std]

pub mod buffer;
pub mod dma;
pub mod pio;

pub use buffer::{CaptureBuffer, TxSourceBuffer, SELF_TEST_PATTERN};
pub use dma::{fifo_port, DmaContext, DmaError, FifoPort, RxDma, TxDma};
pub use pio::{divider, Decoder, Encoder, CYCLES_PER_BIT};
