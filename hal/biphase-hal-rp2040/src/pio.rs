//! Differential Manchester (bi-phase mark) line coding on PIO
//!
//! Every bit period is 16 PIO cycles and always starts with a line
//! transition. A `1` adds a second transition half way through; a `0`
//! holds the line. Receivers therefore only care about transitions, not
//! polarity.
//!
//! Both state machines shift LSB first and move whole 32-bit words
//! through joined FIFOs, which is what the DMA channels expect.

use embassy_rp::gpio::Level;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, Pin, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use pio::{InstructionOperands, SetDestination};

/// PIO cycles per line bit for both programs
pub const CYCLES_PER_BIT: u32 = 16;

/// Pack an integer/fraction divider pair into the state machine format
pub fn divider(int: u16, frac: u8) -> U24F8 {
    U24F8::from_bits(((int as u32) << 8) | frac as u32)
}

fn lsb_first_words() -> ShiftConfig {
    ShiftConfig {
        auto_fill: true,
        threshold: 32,
        direction: ShiftDirection::Right,
    }
}

/// Encoder state machine driving the TX pin
pub struct Encoder<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    _pin: Pin<'d, PIO>,
    origin: u8,
}

impl<'d, PIO: Instance, const SM: usize> Encoder<'d, PIO, SM> {
    /// Load the encoder program and configure `sm`, leaving it stopped
    ///
    /// The pin starts low and is driven only through side-set.
    pub fn new<P: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, P>,
        clock_divider: (u16, u8),
    ) -> Self {
        let prg = pio::pio_asm!(
            ".side_set 1 opt",
            "initial_high:",
            "    out x, 1",
            "    jmp !x high_0 side 1 [6]",
            "high_1:",
            "    nop",
            "    jmp initial_high side 0 [6]",
            "high_0:",
            "    jmp initial_low [7]",
            "initial_low:",
            "    out x, 1",
            "    jmp !x low_0 side 0 [6]",
            "low_1:",
            "    nop",
            "    jmp initial_low side 1 [6]",
            "low_0:",
            "    jmp initial_high [7]",
        );
        let installed = common.load_program(&prg.program);
        let pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&pin]);
        cfg.shift_out = lsb_first_words();
        cfg.fifo_join = FifoJoin::TxOnly;
        let (int, frac) = clock_divider;
        cfg.clock_divider = divider(int, frac);

        sm.set_config(&cfg);
        sm.set_pins(Level::Low, &[&pin]);
        sm.set_pin_dirs(PioDirection::Out, &[&pin]);

        Self {
            sm,
            _pin: pin,
            origin: installed.origin,
        }
    }

    /// Instruction memory offset the program was loaded at
    pub fn origin(&self) -> u8 {
        self.origin
    }

    pub fn set_enable(&mut self, enable: bool) {
        self.sm.set_enable(enable);
    }
}

/// Decoder state machine sampling the RX pin
pub struct Decoder<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    _pin: Pin<'d, PIO>,
    origin: u8,
}

impl<'d, PIO: Instance, const SM: usize> Decoder<'d, PIO, SM> {
    /// Load the decoder program and configure `sm`, leaving it stopped
    ///
    /// Expects an idle-low line. X and Y are preloaded with the constant
    /// `1` and `0` bits the program shifts into the ISR.
    pub fn new<P: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, P>,
        clock_divider: (u16, u8),
    ) -> Self {
        // Sample three eighths into the bit, after the edge that starts it
        let prg = pio::pio_asm!(
            "initial_high:",
            "    wait 1 pin 0 [11]",
            "    jmp pin high_0",
            "high_1:",
            "    in x, 1",
            "    jmp initial_high",
            "high_0:",
            "    in y, 1 [1]",
            ".wrap_target",
            "initial_low:",
            "    wait 0 pin 0 [11]",
            "    jmp pin low_1",
            "low_0:",
            "    in y, 1",
            "    jmp initial_high",
            "low_1:",
            "    in x, 1 [1]",
            ".wrap",
        );
        let installed = common.load_program(&prg.program);
        let pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[]);
        cfg.set_in_pins(&[&pin]);
        cfg.set_jmp_pin(&pin);
        cfg.shift_in = lsb_first_words();
        cfg.fifo_join = FifoJoin::RxOnly;
        let (int, frac) = clock_divider;
        cfg.clock_divider = divider(int, frac);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::In, &[&pin]);

        let set_x = InstructionOperands::SET {
            destination: SetDestination::X,
            data: 1,
        }
        .encode();
        let set_y = InstructionOperands::SET {
            destination: SetDestination::Y,
            data: 0,
        }
        .encode();
        // SAFETY: SET only touches scratch registers of a stopped machine
        unsafe {
            sm.exec_instr(set_x);
            sm.exec_instr(set_y);
        }

        Self {
            sm,
            _pin: pin,
            origin: installed.origin,
        }
    }

    /// Instruction memory offset the program was loaded at
    pub fn origin(&self) -> u8 {
        self.origin
    }

    pub fn set_enable(&mut self, enable: bool) {
        self.sm.set_enable(enable);
    }

    /// Drop anything captured so far; call with the machine stopped
    pub fn clear_fifos(&mut self) {
        self.sm.clear_fifos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_packing() {
        assert_eq!(divider(1, 77).to_bits(), 0x0000_014D);
        assert_eq!(divider(1, 0), U24F8::from_num(1));
        assert_eq!(divider(0xFFFF, 0xFF).to_bits(), 0x00FF_FFFF);
    }

    #[test]
    fn test_divider_value() {
        let div = divider(1, 77);
        assert!(div > U24F8::from_num(1.30) && div < U24F8::from_num(1.31));
    }
}
