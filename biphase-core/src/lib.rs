//! Board-agnostic streaming transport for the link bridge
//!
//! This crate contains the parts of the bridge that do not touch
//! registers directly:
//!
//! - Capture ring geometry and the rotation offset
//! - DMA channel configuration for each direction
//! - Transfer telemetry shared with the transmit interrupt
//! - Transmit path (blocking send, one transfer at a time)
//! - Receive path (continuous capture/forward loop)
//! - Report bridge between the host transport and both paths
//! - Link configuration and validation
//! - USB device status for the status LED

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod configurator;
pub mod receive;
pub mod ring;
pub mod status;
pub mod telemetry;
pub mod transmit;

#[cfg(test)]
mod testing;

pub use bridge::{forward_write, TelemetryResponder, WriteOutcome};
pub use config::{calc_clock_divider, ConfigError, LinkConfig};
pub use configurator::channel_config;
pub use receive::{ReceiveError, ReceivePath};
pub use ring::RotationOffset;
pub use status::UsbStatus;
pub use telemetry::TransferTelemetry;
pub use transmit::{TransmitError, TransmitPath, TxState};
