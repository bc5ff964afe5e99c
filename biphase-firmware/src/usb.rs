//! USB device callbacks
//!
//! Bus events drive the LED status; HID control requests are answered
//! from the transmit telemetry.

use defmt::*;
use embassy_usb::class::hid::{ReportId, RequestHandler};
use embassy_usb::control::OutResponse;
use embassy_usb::Handler;

use biphase_core::{TelemetryResponder, UsbStatus};

use crate::channels::USB_STATUS;

/// Tracks bus state and publishes changes
pub struct UsbStatusHandler {
    status: UsbStatus,
}

impl UsbStatusHandler {
    pub const fn new() -> Self {
        Self {
            status: UsbStatus::NotMounted,
        }
    }

    fn update(&mut self, next: UsbStatus) {
        if next != self.status {
            info!("USB {}", next);
            self.status = next;
            USB_STATUS.signal(next);
        }
    }
}

impl Handler for UsbStatusHandler {
    fn reset(&mut self) {
        self.update(UsbStatus::NotMounted);
    }

    fn configured(&mut self, configured: bool) {
        self.update(self.status.on_configured(configured));
    }

    fn suspended(&mut self, suspended: bool) {
        self.update(self.status.on_suspended(suspended));
    }
}

/// HID control request handler
pub struct TelemetryRequestHandler {
    responder: TelemetryResponder<'static>,
}

impl TelemetryRequestHandler {
    pub fn new(responder: TelemetryResponder<'static>) -> Self {
        Self { responder }
    }
}

impl RequestHandler for TelemetryRequestHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        let raw = match id {
            ReportId::In(id) | ReportId::Out(id) | ReportId::Feature(id) => id,
        };
        let len = self.responder.get_report(raw, buf);
        debug!("GET_REPORT id={=u8:#x} -> {} bytes", raw, len);
        Some(len)
    }

    // Link data arrives on the OUT endpoint only
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let raw = match id {
            ReportId::In(id) | ReportId::Out(id) | ReportId::Feature(id) => id,
        };
        debug!("SET_REPORT id={=u8:#x} ({} bytes) rejected", raw, data.len());
        OutResponse::Rejected
    }
}
