//! Receive path
//!
//! The receive channel writes the capture ring one 16-word block at a
//! time and its completion interrupt re-arms it straight away, so the
//! hardware never waits on software between blocks. This loop is the
//! only reader of the ring: it waits for the interrupt's cumulative
//! block count, forwards each new chunk as one report in ring order,
//! and advances the rotation offset.
//!
//! The loop must stay less than one full ring behind the hardware
//! writer. Once it falls [`CHUNKS_PER_RING`] blocks behind, the oldest
//! unread chunk is being overwritten; that is reported as
//! [`ReceiveError::Overrun`] and the loop resynchronises on the slot
//! the hardware is filling next. The lag is checked again after every
//! chunk copy, since a slow sink lets the hardware keep writing while
//! a batch is being forwarded.

use biphase_hal::dma::CaptureChannel;
use biphase_hal::report::ReportSink;
use biphase_protocol::{REPORT_LEN, WORD_LEN};

use crate::ring::{RotationOffset, CHUNKS_PER_RING, CHUNK_WORDS};

/// Errors from one capture/forward iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError<E> {
    /// The hardware lapped the reader; `dropped` chunks were discarded
    Overrun { dropped: u32 },
    /// The report transport failed; the chunk was dropped
    Sink(E),
}

/// Owner of the receive channel and the capture loop state
pub struct ReceivePath<C: CaptureChannel, S: ReportSink> {
    channel: C,
    sink: S,
    offset: RotationOffset,
    /// Blocks the hardware has completed (wrapping)
    completed: u32,
    /// Blocks forwarded to the sink (wrapping)
    forwarded: u32,
    armed: bool,
}

impl<C: CaptureChannel, S: ReportSink> ReceivePath<C, S> {
    /// Wrap a configured capture channel and a report sink
    pub fn new(channel: C, sink: S) -> Self {
        Self {
            channel,
            sink,
            offset: RotationOffset::new(),
            completed: 0,
            forwarded: 0,
            armed: false,
        }
    }

    /// Position of the next chunk to forward
    pub fn offset(&self) -> RotationOffset {
        self.offset
    }

    /// Chunks forwarded so far (wrapping)
    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }

    /// Report transport
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Capture and forward forever
    ///
    /// Errors are handed to `on_error` and the loop carries on.
    pub async fn run_forever<F>(&mut self, mut on_error: F) -> !
    where
        F: FnMut(ReceiveError<S::Error>),
    {
        loop {
            if let Err(e) = self.poll_once().await {
                on_error(e);
            }
        }
    }

    /// Wait for newly completed blocks and forward them
    ///
    /// Arms the channel on first use. Returns the number of chunks
    /// forwarded by this call.
    pub async fn poll_once(&mut self) -> Result<u32, ReceiveError<S::Error>> {
        if !self.armed {
            self.channel.arm();
            self.armed = true;
        }

        self.completed = self.channel.wait_blocks(self.completed).await;
        self.drain().await
    }

    async fn drain(&mut self) -> Result<u32, ReceiveError<S::Error>> {
        if self.lapped(self.completed) {
            return Err(self.resync(self.completed));
        }

        let mut sent = 0;
        while self.forwarded != self.completed {
            self.forward_chunk().await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// The slot of the next unforwarded chunk has been reused
    fn lapped(&self, completed: u32) -> bool {
        completed.wrapping_sub(self.forwarded) >= CHUNKS_PER_RING as u32
    }

    /// Skip to the slot the hardware fills after block `completed - 1`
    fn resync(&mut self, completed: u32) -> ReceiveError<S::Error> {
        let dropped = completed.wrapping_sub(self.forwarded);
        self.completed = completed;
        self.forwarded = completed;
        self.offset = RotationOffset::at_block(completed);
        ReceiveError::Overrun { dropped }
    }

    /// Send the chunk at the current offset and advance past it
    async fn forward_chunk(&mut self) -> Result<(), ReceiveError<S::Error>> {
        let mut words = [0u32; CHUNK_WORDS];
        self.channel.read_words(self.offset.word_index(), &mut words);

        // The copy is only good if the slot was not reused while it ran
        let now = self.channel.completed();
        if self.lapped(now) {
            return Err(self.resync(now));
        }

        let mut report = [0u8; REPORT_LEN];
        for (dst, word) in report.chunks_exact_mut(WORD_LEN).zip(words) {
            dst.copy_from_slice(&word.to_le_bytes());
        }

        // Advance first: a failed delivery drops the chunk, never retries it
        self.offset.advance();
        self.forwarded = self.forwarded.wrapping_add(1);

        self.sink.send_report(&report).await.map_err(ReceiveError::Sink)
    }
}
