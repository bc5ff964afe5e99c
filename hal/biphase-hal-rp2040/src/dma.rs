//! Raw DMA channel programming for the link streams
//!
//! embassy-rp's DMA driver runs one-shot transfers. The link needs ring
//! wrap, PIO pacing, a read address redirected on every send, and a
//! receive channel re-armed from its own interrupt, so both stream
//! channels are programmed at register level here.
//!
//! Both channels complete on `DMA_IRQ_1`; `DMA_IRQ_0` stays with
//! embassy-rp. The firmware binds the interrupt and forwards it to
//! [`DmaContext::on_interrupt`].

use core::sync::atomic::{compiler_fence, Ordering as FenceOrdering};

use embassy_rp::dma::{AnyChannel, Channel};
use embassy_rp::pac;
use embassy_rp::pac::dma::regs::CtrlTrig;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use biphase_core::config::ConfigError;
use biphase_core::configurator::channel_config;
use biphase_core::ring::{CAPTURE_BYTES, CHUNK_WORDS};
use biphase_core::telemetry::TransferTelemetry;
use biphase_hal::dma::{
    CaptureChannel, ChannelConfig, Dreq, RingSide, RingWrap, StreamDirection, TransferWidth,
    TxChannel,
};

use crate::buffer::{CaptureBuffer, SELF_TEST_PATTERN, TX_RING_BYTES};

/// Interrupt line shared by both stream channels
const IRQ_LINE: usize = 1;

/// Marker for an unregistered channel slot
const NO_CHANNEL: u8 = 0xFF;

/// DMA errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Trigger requested while a transfer is still in flight
    Busy,
    /// Source would straddle the read-side wrap boundary
    RingBoundary,
    /// Channel configuration rejected
    Config(ConfigError),
}

/// FIFO register address and pacing request of one state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoPort {
    pub addr: u32,
    pub dreq: Dreq,
}

/// Locate a state machine's FIFO
///
/// DREQ numbering: PIO0 TX0..3 = 0..3, RX0..3 = 4..7, PIO1 follows at 8.
pub fn fifo_port(block: u8, sm: usize, direction: StreamDirection) -> FifoPort {
    let pio = if block == 0 { pac::PIO0 } else { pac::PIO1 };
    let (addr, dreq_base) = match direction {
        StreamDirection::Transmit => (pio.txf(sm).as_ptr() as u32, 0),
        StreamDirection::Receive => (pio.rxf(sm).as_ptr() as u32, 4),
    };
    FifoPort {
        addr,
        dreq: Dreq(block * 8 + dreq_base + sm as u8),
    }
}

/// Translate a channel configuration into the control register
fn ctrl_word(number: u8, config: &ChannelConfig) -> CtrlTrig {
    let mut ctrl = CtrlTrig::default();
    ctrl.set_data_size(match config.width {
        TransferWidth::Byte => DataSize::SIZE_BYTE,
        TransferWidth::HalfWord => DataSize::SIZE_HALFWORD,
        TransferWidth::Word => DataSize::SIZE_WORD,
    });
    ctrl.set_incr_read(config.read_increment);
    ctrl.set_incr_write(config.write_increment);
    if let Some(ring) = config.ring {
        ctrl.set_ring_size(ring.size_bits);
        ctrl.set_ring_sel(ring.side == RingSide::Write);
    }
    ctrl.set_treq_sel(TreqSel::from(config.dreq.0));
    // Chaining to itself means no chaining
    ctrl.set_chain_to(number);
    ctrl.set_en(true);
    ctrl
}

/// A claimed channel with its programmed control word
struct RawChannel {
    _claim: Peri<'static, AnyChannel>,
    number: u8,
    ctrl: CtrlTrig,
}

impl RawChannel {
    fn claim(ch: Peri<'static, impl Channel>) -> Self {
        let number = ch.number();
        Self {
            _claim: ch.into(),
            number,
            ctrl: CtrlTrig::default(),
        }
    }

    fn regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.number as usize)
    }

    fn mask(&self) -> u32 {
        1 << self.number
    }

    /// Program addresses, count and control without starting
    fn configure(&mut self, config: &ChannelConfig, read: u32, write: u32, count: u32) {
        let regs = self.regs();
        regs.read_addr().write_value(read);
        regs.write_addr().write_value(write);
        regs.trans_count().write_value(count);

        self.ctrl = ctrl_word(self.number, config);
        let mut idle = self.ctrl;
        idle.set_en(false);
        regs.ctrl_trig().write_value(idle);
    }

    /// Start the channel with the last programmed count
    fn trigger(&self) {
        compiler_fence(FenceOrdering::SeqCst);
        self.regs().ctrl_trig().write_value(self.ctrl);
    }

    fn is_busy(&self) -> bool {
        self.regs().ctrl_trig().read().busy()
    }

    /// Route completions to the shared line and away from embassy-rp's
    fn route_irq(&self) {
        let mask = self.mask();
        pac::DMA.inte(0).modify(|w| *w &= !mask);
        pac::DMA.inte(IRQ_LINE).modify(|w| *w |= mask);
    }
}

/// State shared between the stream channels and their interrupt
///
/// Constructed once as a `static` and handed to both channels.
pub struct DmaContext {
    tx_channel: AtomicU8,
    rx_channel: AtomicU8,
    tx_done: Signal<CriticalSectionRawMutex, ()>,
    /// Set at trigger, cleared once the completion has been counted
    tx_in_flight: AtomicBool,
    rx_blocks: AtomicU32,
    rx_ready: Signal<CriticalSectionRawMutex, ()>,
    telemetry: TransferTelemetry,
}

impl DmaContext {
    pub const fn new() -> Self {
        Self {
            tx_channel: AtomicU8::new(NO_CHANNEL),
            rx_channel: AtomicU8::new(NO_CHANNEL),
            tx_done: Signal::new(),
            tx_in_flight: AtomicBool::new(false),
            rx_blocks: AtomicU32::new(0),
            rx_ready: Signal::new(),
            telemetry: TransferTelemetry::new(),
        }
    }

    /// Transmitted-word counter maintained by the transmit completion
    pub fn telemetry(&self) -> &TransferTelemetry {
        &self.telemetry
    }

    /// Capture blocks completed since boot (wrapping)
    pub fn rx_blocks(&self) -> u32 {
        self.rx_blocks.load(Ordering::Acquire)
    }

    /// Body of the `DMA_IRQ_1` handler
    ///
    /// Transmit completion: acknowledge, count the words, wake the sender.
    /// Receive completion: acknowledge, re-arm at once, publish the block.
    pub fn on_interrupt(&self) {
        let ints = pac::DMA.ints(IRQ_LINE).read();

        let tx = self.tx_channel.load(Ordering::Relaxed);
        if tx != NO_CHANNEL && ints & (1 << tx) != 0 {
            pac::DMA.ints(IRQ_LINE).write_value(1 << tx);
            self.telemetry.on_transfer_complete();
            self.tx_in_flight.store(false, Ordering::Release);
            self.tx_done.signal(());
        }

        let rx = self.rx_channel.load(Ordering::Relaxed);
        if rx != NO_CHANNEL && ints & (1 << rx) != 0 {
            pac::DMA.ints(IRQ_LINE).write_value(1 << rx);
            let regs = pac::DMA.ch(rx as usize);
            regs.ctrl_trig().write_value(regs.ctrl_trig().read());
            self.rx_blocks.fetch_add(1, Ordering::Release);
            self.rx_ready.signal(());
        }
    }
}

impl Default for DmaContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Transmit stream channel
pub struct TxDma {
    ch: RawChannel,
    ctx: &'static DmaContext,
    ring: RingWrap,
}

impl TxDma {
    /// Claim and configure the transmit channel
    ///
    /// The read side wraps over [`SELF_TEST_PATTERN`] until the first
    /// send redirects it. The channel is left unstarted with its
    /// completion routed to `DMA_IRQ_1`.
    pub fn new(
        ctx: &'static DmaContext,
        ch: Peri<'static, impl Channel>,
        fifo: FifoPort,
    ) -> Result<Self, DmaError> {
        let config = channel_config(StreamDirection::Transmit, TX_RING_BYTES, fifo.dreq)
            .map_err(DmaError::Config)?;
        let ring = config.ring.ok_or(DmaError::Config(ConfigError::RingTooSmall))?;

        let mut ch = RawChannel::claim(ch);
        ch.configure(
            &config,
            SELF_TEST_PATTERN.as_bytes().as_ptr() as u32,
            fifo.addr,
            CHUNK_WORDS as u32,
        );
        ctx.tx_channel.store(ch.number, Ordering::Release);
        ch.route_irq();

        Ok(Self { ch, ctx, ring })
    }

    /// Hardware channel number
    pub fn number(&self) -> u8 {
        self.ch.number
    }
}

impl TxChannel for TxDma {
    type Error = DmaError;

    fn is_busy(&self) -> bool {
        self.ctx.tx_in_flight.load(Ordering::Acquire) || self.ch.is_busy()
    }

    async fn transfer(&mut self, words: &[u32]) -> Result<(), DmaError> {
        if self.is_busy() {
            return Err(DmaError::Busy);
        }
        let addr = words.as_ptr() as usize;
        if !self.ring.contains(addr, words.len() * 4) {
            return Err(DmaError::RingBoundary);
        }

        self.ctx.tx_done.reset();
        let regs = self.ch.regs();
        regs.read_addr().write_value(addr as u32);
        regs.trans_count().write_value(words.len() as u32);
        self.ctx.tx_in_flight.store(true, Ordering::Release);
        self.ch.trigger();

        self.ctx.tx_done.wait().await;
        compiler_fence(FenceOrdering::SeqCst);
        Ok(())
    }
}

/// Receive stream channel writing the capture ring
pub struct RxDma {
    ch: RawChannel,
    ctx: &'static DmaContext,
    buffer: &'static CaptureBuffer,
}

impl RxDma {
    /// Claim and configure the receive channel
    ///
    /// The write side wraps over the whole capture ring; every trigger
    /// moves one chunk. The decoder state machine should be stopped with
    /// empty FIFOs while this runs.
    pub fn new(
        ctx: &'static DmaContext,
        ch: Peri<'static, impl Channel>,
        buffer: &'static CaptureBuffer,
        fifo: FifoPort,
    ) -> Result<Self, DmaError> {
        let config = channel_config(StreamDirection::Receive, CAPTURE_BYTES, fifo.dreq)
            .map_err(DmaError::Config)?;

        let mut ch = RawChannel::claim(ch);
        ch.configure(&config, fifo.addr, buffer.base() as u32, CHUNK_WORDS as u32);
        ctx.rx_channel.store(ch.number, Ordering::Release);
        ch.route_irq();

        Ok(Self { ch, ctx, buffer })
    }

    /// Hardware channel number
    pub fn number(&self) -> u8 {
        self.ch.number
    }
}

impl CaptureChannel for RxDma {
    fn arm(&mut self) {
        self.ch.trigger();
    }

    async fn wait_blocks(&mut self, seen: u32) -> u32 {
        loop {
            let blocks = self.ctx.rx_blocks();
            if blocks != seen {
                return blocks;
            }
            self.ctx.rx_ready.wait().await;
        }
    }

    fn completed(&self) -> u32 {
        compiler_fence(FenceOrdering::SeqCst);
        self.ctx.rx_blocks()
    }

    fn read_words(&self, start: usize, out: &mut [u32]) {
        compiler_fence(FenceOrdering::SeqCst);
        self.buffer.read_words(start, out);
    }
}
