//! Transmit path
//!
//! Host payloads go straight to the DMA engine: the caller's buffer is
//! reinterpreted as words and becomes the channel's read source for one
//! trigger. `send` returns only after the channel has drained, which is
//! the only flow control between the host and the line.

use biphase_hal::dma::TxChannel;
use biphase_protocol::validate_write_len;

use crate::telemetry::TransferTelemetry;

/// Transmit path state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    /// No transfer in flight
    Idle,
    /// A trigger has been issued and not yet drained
    Transferring,
}

/// Errors from a send request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError<E> {
    /// Payload shorter than 64 bytes or not a whole number of words
    InvalidLength(usize),
    /// Payload does not start on a word boundary
    Misaligned,
    /// An earlier transfer has not completed yet
    Busy,
    /// The channel refused or failed the transfer
    Channel(E),
}

/// Owner of the transmit channel
pub struct TransmitPath<'a, C: TxChannel> {
    channel: C,
    telemetry: &'a TransferTelemetry,
}

impl<'a, C: TxChannel> TransmitPath<'a, C> {
    /// Wrap a configured, unstarted channel
    pub fn new(channel: C, telemetry: &'a TransferTelemetry) -> Self {
        Self {
            channel,
            telemetry,
        }
    }

    /// Current state, as seen by the channel
    pub fn state(&self) -> TxState {
        if self.channel.is_busy() {
            TxState::Transferring
        } else {
            TxState::Idle
        }
    }

    /// Telemetry updated by this path's completion interrupt
    pub fn telemetry(&self) -> &'a TransferTelemetry {
        self.telemetry
    }

    /// Transmit `payload` and wait until the line has taken all of it
    ///
    /// The payload must be at least 64 bytes, a multiple of 4 bytes, and
    /// word aligned. On any precondition failure no transfer is made.
    /// Returns the number of words sent.
    ///
    /// Dropping the future mid-transfer leaves the path in
    /// [`TxState::Transferring`] until the hardware finishes the block and
    /// its completion is counted; sends made meanwhile fail with
    /// [`TransmitError::Busy`] and leave the telemetry untouched.
    pub async fn send(&mut self, payload: &[u8]) -> Result<usize, TransmitError<C::Error>> {
        let words = validate_write_len(payload.len())
            .map_err(|_| TransmitError::InvalidLength(payload.len()))?;
        let source: &[u32] =
            bytemuck::try_cast_slice(payload).map_err(|_| TransmitError::Misaligned)?;

        // The armed count belongs to the outstanding trigger until it completes
        if self.state() == TxState::Transferring {
            return Err(TransmitError::Busy);
        }

        self.telemetry.arm(words as u32);
        self.channel
            .transfer(source)
            .await
            .map_err(TransmitError::Channel)?;
        Ok(words)
    }
}
