//! HID OUT task
//!
//! Reads output reports into the ring-aligned transmit source and sends
//! each one on the line. Sends are serialized by this task owning the
//! transmit path. Rejected payloads are logged and otherwise ignored;
//! the host never sees an error.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_usb::class::hid::{HidReader, ReadError};

use biphase_core::{forward_write, TransmitPath, WriteOutcome};
use biphase_hal_rp2040::{DmaError, Encoder, TxDma, TxSourceBuffer, SELF_TEST_PATTERN};
use biphase_protocol::REPORT_LEN;

use super::UsbDriver;
use crate::board::LINK_CONFIG;

#[embassy_executor::task]
pub async fn hid_out_task(
    mut reader: HidReader<'static, UsbDriver, REPORT_LEN>,
    mut tx: TransmitPath<'static, TxDma>,
    _encoder: Encoder<'static, PIO0, 0>,
    source: &'static mut TxSourceBuffer,
) {
    info!("HID OUT task started");

    if LINK_CONFIG.self_test_on_boot {
        info!("Sending {} byte self-test pattern", SELF_TEST_PATTERN.as_bytes().len());
        log_outcome(forward_write(&mut tx, SELF_TEST_PATTERN.as_bytes()).await);
    }

    loop {
        reader.ready().await;

        let len = match reader.read(&mut source.0[..REPORT_LEN]).await {
            Ok(len) => len,
            Err(ReadError::Disabled) => continue,
            Err(e) => {
                warn!("OUT report read failed: {}", Debug2Format(&e));
                continue;
            }
        };

        log_outcome(forward_write(&mut tx, &source.0[..len]).await);
    }
}

fn log_outcome(outcome: WriteOutcome<DmaError>) {
    match outcome {
        WriteOutcome::Sent { words } => trace!("sent {} words", words),
        WriteOutcome::Dropped(e) => warn!("write dropped: {}", e),
    }
}
