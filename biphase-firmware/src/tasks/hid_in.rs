//! HID IN task
//!
//! Writes captured chunks to the host, one input report each.

use defmt::*;
use embassy_usb::class::hid::HidWriter;

use biphase_protocol::REPORT_LEN;

use super::UsbDriver;
use crate::channels::CHUNK_CHANNEL;

#[embassy_executor::task]
pub async fn hid_in_task(mut writer: HidWriter<'static, UsbDriver, REPORT_LEN>) {
    info!("HID IN task started");

    loop {
        let chunk = CHUNK_CHANNEL.receive().await;

        // Holds chunks back while the host has not configured the device
        writer.ready().await;

        match writer.write(&chunk).await {
            Ok(()) => trace!("IN report sent"),
            Err(e) => debug!("IN report dropped: {}", e),
        }
    }
}
