//! Biphase Hardware Abstraction Layer
//!
//! This crate defines the hardware seams of the link bridge so the
//! streaming logic can run against the RP2040 in firmware and against
//! in-memory doubles on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  biphase-firmware (tasks, USB, IRQs)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  biphase-core (transmit / receive path) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  biphase-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ biphase-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`dma::TxChannel`] - Blocking drain of a word buffer into the encoder FIFO
//! - [`dma::CaptureChannel`] - Continuously re-armed capture into a ring
//! - [`report::ReportSink`] - Outbound reports towards the host

#![no_std]
#![deny(unsafe_code)]

pub mod dma;
pub mod report;

// Re-export key traits at crate root for convenience
pub use dma::{CaptureChannel, ChannelConfig, Dreq, RingSide, RingWrap, StreamDirection, TransferWidth, TxChannel};
pub use report::ReportSink;
