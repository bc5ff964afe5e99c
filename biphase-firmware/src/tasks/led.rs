//! Status LED task
//!
//! Blinks with a half-period that reflects the USB device status.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Timer};

use biphase_core::UsbStatus;

use crate::channels::USB_STATUS;

#[embassy_executor::task]
pub async fn led_task(mut led: Output<'static>) {
    info!("LED task started");

    let mut status = UsbStatus::default();

    loop {
        let interval = Duration::from_millis(status.blink_interval_ms());
        match select(Timer::after(interval), USB_STATUS.wait()).await {
            Either::First(()) => led.toggle(),
            Either::Second(next) => status = next,
        }
    }
}
