//! In-memory doubles for the hardware seams
//!
//! `MockTx` stands in for the transmit channel and its completion
//! interrupt, `MockCapture` for the receive channel filling the ring, and
//! a shared [`Line`] connects the two for loopback tests.

use core::cell::{Cell, RefCell};

use heapless::{Deque, Vec};

use biphase_hal::dma::{CaptureChannel, TxChannel};
use biphase_hal::report::ReportSink;
use biphase_protocol::REPORT_LEN;

use crate::ring::{CAPTURE_WORDS, CHUNKS_PER_RING, CHUNK_WORDS};
use crate::telemetry::TransferTelemetry;

pub use embassy_futures::block_on;

/// Word-aligned byte buffer, like the firmware's report buffers
#[repr(C, align(4))]
pub struct Aligned<const N: usize>(pub [u8; N]);

/// Words in flight between a mock encoder and decoder
pub type Line = RefCell<Deque<u32, 1024>>;

/// Injected hardware fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

/// Word `index` of block `block` when no line is attached
pub fn pattern_word(block: u32, index: u32) -> u32 {
    (block << 16) | index
}

pub struct MockTx<'a> {
    telemetry: &'a TransferTelemetry,
    line: Option<&'a Line>,
    /// Word count of every trigger issued
    pub transfers: Vec<usize, 32>,
    pub fail: bool,
    /// Report an outstanding trigger
    pub busy: bool,
}

impl<'a> MockTx<'a> {
    pub fn new(telemetry: &'a TransferTelemetry) -> Self {
        Self {
            telemetry,
            line: None,
            transfers: Vec::new(),
            fail: false,
            busy: false,
        }
    }

    pub fn with_line(telemetry: &'a TransferTelemetry, line: &'a Line) -> Self {
        Self {
            line: Some(line),
            ..Self::new(telemetry)
        }
    }
}

impl TxChannel for MockTx<'_> {
    type Error = MockFault;

    fn is_busy(&self) -> bool {
        self.busy
    }

    async fn transfer(&mut self, words: &[u32]) -> Result<(), MockFault> {
        if self.fail {
            return Err(MockFault);
        }
        if let Some(line) = self.line {
            let mut line = line.borrow_mut();
            for &word in words {
                line.push_back(word).map_err(|_| MockFault)?;
            }
        }
        self.transfers.push(words.len()).map_err(|_| MockFault)?;

        // Completion interrupt
        self.telemetry.on_transfer_complete();
        Ok(())
    }
}

pub struct MockCapture<'a> {
    ring: RefCell<[u32; CAPTURE_WORDS]>,
    completed: Cell<u32>,
    /// Blocks to complete on each successive wait
    script: Deque<u32, 64>,
    /// Blocks completed in the background, outside any wait
    backlog: Option<&'a Cell<u32>>,
    line: Option<&'a Line>,
    pub arms: u32,
}

impl<'a> MockCapture<'a> {
    pub fn new() -> Self {
        Self {
            ring: RefCell::new([0; CAPTURE_WORDS]),
            completed: Cell::new(0),
            script: Deque::new(),
            backlog: None,
            line: None,
            arms: 0,
        }
    }

    pub fn with_line(line: &'a Line) -> Self {
        Self {
            line: Some(line),
            ..Self::new()
        }
    }

    /// Hardware that keeps capturing whatever `backlog` is raised by
    pub fn with_backlog(backlog: &'a Cell<u32>) -> Self {
        Self {
            backlog: Some(backlog),
            ..Self::new()
        }
    }

    /// Complete `blocks` more blocks on the next wait
    pub fn script(&mut self, blocks: u32) {
        let _ = self.script.push_back(blocks);
    }

    /// Hardware writes one block into its ring slot
    fn capture_block(&self) {
        let completed = self.completed.get();
        let slot = (completed as usize % CHUNKS_PER_RING) * CHUNK_WORDS;
        let mut ring = self.ring.borrow_mut();
        for i in 0..CHUNK_WORDS {
            let word = match self.line {
                Some(line) => line.borrow_mut().pop_front().unwrap_or(0),
                None => pattern_word(completed, i as u32),
            };
            ring[slot + i] = word;
        }
        self.completed.set(completed.wrapping_add(1));
    }

    fn catch_up(&self) {
        if let Some(backlog) = self.backlog {
            for _ in 0..backlog.take() {
                self.capture_block();
            }
        }
    }
}

impl CaptureChannel for MockCapture<'_> {
    fn arm(&mut self) {
        self.arms += 1;
    }

    async fn wait_blocks(&mut self, _seen: u32) -> u32 {
        self.catch_up();
        let blocks = self.script.pop_front().unwrap_or(0);
        for _ in 0..blocks {
            self.capture_block();
        }
        self.completed.get()
    }

    fn completed(&self) -> u32 {
        self.catch_up();
        self.completed.get()
    }

    fn read_words(&self, start: usize, out: &mut [u32]) {
        self.catch_up();
        out.copy_from_slice(&self.ring.borrow()[start..start + out.len()]);
    }
}

pub struct VecSink {
    pub reports: Vec<[u8; REPORT_LEN], 64>,
    pub fail_next: bool,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            fail_next: false,
        }
    }

    pub fn reports(&self) -> &[[u8; REPORT_LEN]] {
        &self.reports
    }
}

impl ReportSink for VecSink {
    type Error = MockFault;

    async fn send_report(&mut self, report: &[u8]) -> Result<(), MockFault> {
        if self.fail_next {
            self.fail_next = false;
            return Err(MockFault);
        }
        let mut copy = [0u8; REPORT_LEN];
        copy.copy_from_slice(report);
        self.reports.push(copy).map_err(|_| MockFault)
    }
}

/// Sink whose first delivery lets the capture hardware run on
pub struct StallingSink<'a> {
    inner: VecSink,
    backlog: &'a Cell<u32>,
    stall: u32,
}

impl<'a> StallingSink<'a> {
    /// The first report takes `blocks` blocks of line time to go out
    pub fn new(backlog: &'a Cell<u32>, blocks: u32) -> Self {
        Self {
            inner: VecSink::new(),
            backlog,
            stall: blocks,
        }
    }

    pub fn reports(&self) -> &[[u8; REPORT_LEN]] {
        self.inner.reports()
    }
}

impl ReportSink for StallingSink<'_> {
    type Error = MockFault;

    async fn send_report(&mut self, report: &[u8]) -> Result<(), MockFault> {
        self.backlog.set(self.backlog.get() + core::mem::take(&mut self.stall));
        self.inner.send_report(report).await
    }
}
