//! Telemetry/report bridge
//!
//! Glue between host report callbacks and the two streaming paths.
//! Neither direction reports failure to the host: unknown read requests
//! answer with zero bytes and rejected writes are still acknowledged.

use biphase_hal::dma::TxChannel;
use biphase_protocol::{encode_telemetry, ReportKind};

use crate::telemetry::TransferTelemetry;
use crate::transmit::{TransmitError, TransmitPath};

/// Answers host read requests from the telemetry counter
#[derive(Debug, Clone, Copy)]
pub struct TelemetryResponder<'a> {
    telemetry: &'a TransferTelemetry,
}

impl<'a> TelemetryResponder<'a> {
    pub fn new(telemetry: &'a TransferTelemetry) -> Self {
        Self { telemetry }
    }

    /// Fill `buffer` for report `id` and return the byte count
    ///
    /// Zero means "no data": either the identifier is not served or the
    /// buffer cannot hold the response.
    pub fn get_report(&self, id: u8, buffer: &mut [u8]) -> usize {
        match ReportKind::from_id(id) {
            ReportKind::Telemetry => encode_telemetry(self.telemetry.words(), buffer).unwrap_or(0),
            ReportKind::Unknown(_) => 0,
        }
    }
}

/// Result of a host write request
///
/// Both variants are acknowledged to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome<E> {
    /// Payload went out on the line
    Sent { words: usize },
    /// Payload was dropped
    Dropped(TransmitError<E>),
}

/// Forward a host write payload to the transmit path
pub async fn forward_write<C: TxChannel>(
    tx: &mut TransmitPath<'_, C>,
    payload: &[u8],
) -> WriteOutcome<C::Error> {
    match tx.send(payload).await {
        Ok(words) => WriteOutcome::Sent { words },
        Err(e) => WriteOutcome::Dropped(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receive::ReceivePath;
    use crate::testing::{block_on, Aligned, Line, MockCapture, MockTx, VecSink};
    use biphase_protocol::{REPORT_LEN, TELEMETRY_REPORT_ID};

    #[test]
    fn test_telemetry_report() {
        let telemetry = TransferTelemetry::new();
        telemetry.arm(0x0102_0304);
        telemetry.on_transfer_complete();

        let responder = TelemetryResponder::new(&telemetry);
        let mut buf = [0u8; 64];
        assert_eq!(responder.get_report(TELEMETRY_REPORT_ID, &mut buf), 4);
        assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_unknown_report_is_empty() {
        let telemetry = TransferTelemetry::new();
        let responder = TelemetryResponder::new(&telemetry);
        let mut buf = [0xEEu8; 64];

        assert_eq!(responder.get_report(0, &mut buf), 0);
        assert_eq!(responder.get_report(0x42, &mut buf), 0);
        assert!(buf.iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_short_response_buffer_is_empty() {
        let telemetry = TransferTelemetry::new();
        let responder = TelemetryResponder::new(&telemetry);
        let mut buf = [0u8; 2];
        assert_eq!(responder.get_report(TELEMETRY_REPORT_ID, &mut buf), 0);
    }

    #[test]
    fn test_write_then_read_telemetry() {
        let telemetry = TransferTelemetry::new();
        let mut tx = TransmitPath::new(MockTx::new(&telemetry), &telemetry);
        let responder = TelemetryResponder::new(&telemetry);
        let payload = Aligned([0u8; 64]);
        let mut buf = [0u8; 4];

        assert_eq!(block_on(forward_write(&mut tx, &payload.0)), WriteOutcome::Sent { words: 16 });
        assert_eq!(responder.get_report(TELEMETRY_REPORT_ID, &mut buf), 4);
        assert_eq!(u32::from_le_bytes(buf), 16);

        // Rejected write leaves the counter alone
        assert_eq!(
            block_on(forward_write(&mut tx, &payload.0[..63])),
            WriteOutcome::Dropped(TransmitError::InvalidLength(63))
        );
        responder.get_report(TELEMETRY_REPORT_ID, &mut buf);
        assert_eq!(u32::from_le_bytes(buf), 16);
    }

    #[test]
    fn test_loopback_round_trip() {
        let line = Line::default();
        let telemetry = TransferTelemetry::new();
        let mut tx = TransmitPath::new(MockTx::with_line(&telemetry, &line), &telemetry);

        let mut capture = MockCapture::with_line(&line);
        capture.script(3);
        let mut rx = ReceivePath::new(capture, VecSink::new());

        let mut payload = Aligned([0u8; 192]);
        for (i, byte) in payload.0.iter_mut().enumerate() {
            *byte = (i * 7 + 3) as u8;
        }

        assert_eq!(block_on(forward_write(&mut tx, &payload.0)), WriteOutcome::Sent { words: 48 });
        assert_eq!(block_on(rx.poll_once()), Ok(3));

        let received = rx.sink().reports();
        assert_eq!(received.len(), 3);
        for (report, expected) in received.iter().zip(payload.0.chunks_exact(REPORT_LEN)) {
            assert_eq!(&report[..], expected);
        }
    }
}
