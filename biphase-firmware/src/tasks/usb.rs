//! USB device task

use defmt::*;
use embassy_usb::UsbDevice;

use super::UsbDriver;

/// Runs the USB device stack (enumeration, control requests, bus events)
#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB task started");
    usb.run().await
}
