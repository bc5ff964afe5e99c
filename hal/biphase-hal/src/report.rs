//! Host report transport abstractions

/// Destination for outbound (device to host) reports
pub trait ReportSink {
    /// Error type for report delivery
    type Error;

    /// Deliver one report
    ///
    /// Resolves when the transport has taken ownership of the bytes.
    fn send_report(&mut self, report: &[u8]) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
