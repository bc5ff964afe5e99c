//! Embassy async tasks
//!
//! Core0 runs the USB device and both HID endpoints; core1 runs only the
//! capture loop so forwarding never waits behind USB traffic.

pub mod capture;
pub mod hid_in;
pub mod hid_out;
pub mod led;
pub mod usb;

pub use capture::capture_task;
pub use hid_in::hid_in_task;
pub use hid_out::hid_out_task;
pub use led::led_task;
pub use usb::usb_task;

/// USB driver type shared by the device and HID tasks
pub type UsbDriver = embassy_rp::usb::Driver<'static, embassy_rp::peripherals::USB>;
