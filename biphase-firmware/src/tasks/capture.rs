//! Capture task (core1)
//!
//! Runs the receive path forever: waits for capture blocks from the
//! DMA interrupt and queues each chunk for the HID IN task.

use core::convert::Infallible;

use defmt::*;
use embassy_rp::peripherals::PIO0;

use biphase_core::{ReceiveError, ReceivePath};
use biphase_hal::report::ReportSink;
use biphase_hal_rp2040::{Decoder, RxDma};
use biphase_protocol::REPORT_LEN;

use crate::channels::{Chunk, CHUNK_CHANNEL};

/// Report sink feeding the cross-core chunk channel
///
/// Waits for room, so a stalled host backs up into the capture loop,
/// which then reports the overrun.
pub struct ChunkSink;

impl ReportSink for ChunkSink {
    type Error = Infallible;

    async fn send_report(&mut self, report: &[u8]) -> Result<(), Infallible> {
        let mut chunk: Chunk = [0; REPORT_LEN];
        let len = report.len().min(REPORT_LEN);
        chunk[..len].copy_from_slice(&report[..len]);
        CHUNK_CHANNEL.send(chunk).await;
        Ok(())
    }
}

#[embassy_executor::task]
pub async fn capture_task(rx: RxDma, mut decoder: Decoder<'static, PIO0, 1>) {
    info!("Capture task started on core1 (DMA channel {})", rx.number());

    // The decoder FIFO holds the first words until the channel is armed
    decoder.clear_fifos();
    decoder.set_enable(true);

    let mut path = ReceivePath::new(rx, ChunkSink);
    path.run_forever(|e| match e {
        ReceiveError::Overrun { dropped } => warn!("capture overrun, {} chunks dropped", dropped),
        ReceiveError::Sink(never) => match never {},
    })
    .await
}
