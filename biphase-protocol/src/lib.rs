//! Biphase host report protocol
//!
//! This crate defines the USB HID surface between the host and the link
//! bridge. The device enumerates as a vendor-defined HID interface with
//! fixed 64-byte reports in both directions:
//!
//! ```text
//!  host ── OUT report (≥64 B, multiple of 4) ──▶ encoder ──▶ line
//!  host ◀── IN report (exactly 64 B chunk) ──── decoder ◀── line
//!  host ── GET_REPORT(0xFF) ──▶ 4-byte LE transmitted-word count
//! ```
//!
//! Payload bytes are forwarded untouched; there is no framing or
//! checksum at this layer.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod descriptor;
pub mod report;

pub use descriptor::REPORT_DESCRIPTOR;
pub use report::{
    encode_telemetry, validate_write_len, ReportError, ReportKind,
    MIN_WRITE_LEN, REPORT_LEN, TELEMETRY_LEN, TELEMETRY_REPORT_ID, WORD_LEN,
};
