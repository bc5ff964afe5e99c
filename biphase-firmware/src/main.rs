//! Biphase - USB HID to Differential Manchester bridge
//!
//! Main firmware binary for RP2040 boards. Host output reports are sent
//! on a bi-phase mark (FM1) line by a PIO encoder fed by DMA; a PIO
//! decoder captures the line into a DMA ring whose 64-byte chunks go back
//! to the host as input reports. The transmitted word count is readable
//! with a GET_REPORT on the telemetry id.
//!
//! Core0 runs USB and the transmit path. Core1 services the DMA
//! completion interrupt and runs the capture loop.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{PIO0, USB};
use embassy_rp::pio::{Common, Pio};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_usb::class::hid::{
    Config as HidConfig, HidBootProtocol, HidReaderWriter, HidSubclass, State as HidState,
};
use embassy_usb::Builder;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use biphase_core::{TelemetryResponder, TransmitPath};
use biphase_hal::dma::StreamDirection;
use biphase_hal_rp2040::{fifo_port, CaptureBuffer, Decoder, Encoder, RxDma, TxDma, TxSourceBuffer};
use biphase_protocol::{REPORT_DESCRIPTOR, REPORT_LEN};

use crate::board::LINK_CONFIG;
use crate::channels::DMA_CONTEXT;
use crate::usb::{TelemetryRequestHandler, UsbStatusHandler};

mod board;
mod channels;
mod tasks;
mod usb;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Core1 stack and executor
static mut CORE1_STACK: Stack<4096> = Stack::new();
static CORE1_EXECUTOR: StaticCell<Executor> = StaticCell::new();

// DMA buffers (ring aligned)
static CAPTURE_BUFFER: CaptureBuffer = CaptureBuffer::new();
static TX_SOURCE: StaticCell<TxSourceBuffer> = StaticCell::new();

// PIO instruction memory must outlive both state machines
static PIO_COMMON: StaticCell<Common<'static, PIO0>> = StaticCell::new();

// USB descriptors and state (must live forever)
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<HidState> = StaticCell::new();
static DEVICE_HANDLER: StaticCell<UsbStatusHandler> = StaticCell::new();
static REQUEST_HANDLER: StaticCell<TelemetryRequestHandler> = StaticCell::new();

/// DMA completion interrupt for both stream channels
///
/// Enabled on core1 only, so it runs there.
#[interrupt]
unsafe fn DMA_IRQ_1() {
    DMA_CONTEXT.on_interrupt();
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("USB HID To Differential Manchester (Bi-Phase Mark Code FM1)");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let divider = LINK_CONFIG.clock_divider();
    info!(
        "Link: {} bit/s, divider {}+{}/256, tx GPIO{} sm{}, rx GPIO{} sm{}",
        LINK_CONFIG.bit_rate_hz,
        divider.0,
        divider.1,
        LINK_CONFIG.tx_pin,
        LINK_CONFIG.tx_sm,
        LINK_CONFIG.rx_pin,
        LINK_CONFIG.rx_sm
    );

    // Line coding state machines
    // Pin and state machine assignment is fixed by the board module
    let Pio {
        common, sm0, sm1, ..
    } = Pio::new(p.PIO0, Irqs);
    let common = PIO_COMMON.init(common);

    let mut encoder = Encoder::new(common, sm0, p.PIN_14, divider);
    info!("Transmit program loaded at {}", encoder.origin());
    let decoder = Decoder::new(common, sm1, p.PIN_15, divider);
    info!("Receive program loaded at {}", decoder.origin());

    // Stream channels
    let tx_fifo = fifo_port(
        LINK_CONFIG.pio,
        LINK_CONFIG.tx_sm as usize,
        StreamDirection::Transmit,
    );
    let rx_fifo = fifo_port(
        LINK_CONFIG.pio,
        LINK_CONFIG.rx_sm as usize,
        StreamDirection::Receive,
    );
    let tx_dma = unwrap!(TxDma::new(&DMA_CONTEXT, p.DMA_CH0, tx_fifo));
    let rx_dma = unwrap!(RxDma::new(&DMA_CONTEXT, p.DMA_CH1, &CAPTURE_BUFFER, rx_fifo));
    info!(
        "DMA channels: tx {} (dreq {}), rx {} (dreq {})",
        tx_dma.number(),
        tx_fifo.dreq.0,
        rx_dma.number(),
        rx_fifo.dreq.0
    );

    encoder.set_enable(true);
    let tx_path = TransmitPath::new(tx_dma, DMA_CONTEXT.telemetry());

    // USB HID device
    let driver = Driver::new(p.USB, Irqs);

    let mut config = embassy_usb::Config::new(board::USB_VID, board::USB_PID);
    config.manufacturer = Some(board::USB_MANUFACTURER);
    config.product = Some(board::USB_PRODUCT);
    config.serial_number = Some(board::USB_SERIAL);
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(DEVICE_HANDLER.init(UsbStatusHandler::new()));

    let request_handler = REQUEST_HANDLER.init(TelemetryRequestHandler::new(
        TelemetryResponder::new(DMA_CONTEXT.telemetry()),
    ));
    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(request_handler),
        poll_ms: board::HID_POLL_MS,
        max_packet_size: REPORT_LEN as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };
    let hid = HidReaderWriter::<_, REPORT_LEN, REPORT_LEN>::new(
        &mut builder,
        HID_STATE.init(HidState::new()),
        hid_config,
    );
    let usb = builder.build();
    let (reader, writer) = hid.split();

    info!("USB HID initialized");

    // Core1: DMA interrupt and capture loop
    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            interrupt::DMA_IRQ_1.set_priority(Priority::P1);
            // SAFETY: the handler only touches the shared DMA context
            unsafe { interrupt::DMA_IRQ_1.enable() };

            let executor = CORE1_EXECUTOR.init(Executor::new());
            executor.run(|spawner| spawner.spawn(tasks::capture_task(rx_dma, decoder)).unwrap());
        },
    );

    // Spawn tasks
    spawner.spawn(tasks::usb_task(usb)).unwrap();
    spawner.spawn(tasks::led_task(Output::new(p.PIN_25, Level::Low))).unwrap();
    spawner.spawn(tasks::hid_in_task(writer)).unwrap();
    spawner
        .spawn(tasks::hid_out_task(
            reader,
            tx_path,
            encoder,
            TX_SOURCE.init(TxSourceBuffer::zeroed()),
        ))
        .unwrap();

    info!("All tasks spawned, bridge running");
}
