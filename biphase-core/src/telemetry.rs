//! Transfer telemetry
//!
//! Cumulative count of words pushed onto the line. The transmit path
//! records how many words the next trigger will move; the completion
//! interrupt adds that amount. Readers take a single relaxed load, so a
//! read racing an in-flight transfer sees either the old or the new
//! total, never a torn value.

use portable_atomic::{AtomicU32, Ordering};

/// Counter shared between the transmit interrupt and host requests
#[derive(Debug, Default)]
pub struct TransferTelemetry {
    /// Words transmitted since boot (wraps at u32::MAX)
    words: AtomicU32,
    /// Word count programmed for the in-flight trigger
    armed: AtomicU32,
}

impl TransferTelemetry {
    /// Create a zeroed counter
    pub const fn new() -> Self {
        Self {
            words: AtomicU32::new(0),
            armed: AtomicU32::new(0),
        }
    }

    /// Record the word count of the transfer about to be triggered
    ///
    /// Called by the transmit path before the trigger, never while a
    /// transfer is in flight.
    pub fn arm(&self, words: u32) {
        self.armed.store(words, Ordering::Release);
    }

    /// Account for a finished transfer
    ///
    /// Interrupt context only. Returns the new total.
    pub fn on_transfer_complete(&self) -> u32 {
        let words = self.armed.swap(0, Ordering::Acquire);
        self.words.fetch_add(words, Ordering::Relaxed).wrapping_add(words)
    }

    /// Current total
    pub fn words(&self) -> u32 {
        self.words.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let telemetry = TransferTelemetry::new();
        assert_eq!(telemetry.words(), 0);
    }

    #[test]
    fn test_completion_adds_armed_words() {
        let telemetry = TransferTelemetry::new();

        telemetry.arm(16);
        assert_eq!(telemetry.words(), 0);
        assert_eq!(telemetry.on_transfer_complete(), 16);

        telemetry.arm(64);
        assert_eq!(telemetry.on_transfer_complete(), 80);
        assert_eq!(telemetry.words(), 80);
    }

    #[test]
    fn test_spurious_completion_adds_nothing() {
        let telemetry = TransferTelemetry::new();
        telemetry.arm(16);
        telemetry.on_transfer_complete();

        // Second interrupt without a new trigger
        assert_eq!(telemetry.on_transfer_complete(), 16);
    }

    #[test]
    fn test_monotonic() {
        let telemetry = TransferTelemetry::new();
        let mut last = 0;
        for words in [16u32, 17, 64, 256, 16] {
            telemetry.arm(words);
            let now = telemetry.on_transfer_complete();
            assert!(now > last);
            last = now;
        }
    }
}
