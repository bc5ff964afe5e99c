//! Report sizes, identifiers and the telemetry response encoding

/// Size of every outbound report, one capture chunk
pub const REPORT_LEN: usize = 64;

/// Size of one line word
pub const WORD_LEN: usize = 4;

/// Smallest accepted write payload (one burst)
pub const MIN_WRITE_LEN: usize = 64;

/// Reserved report identifier for the transmitted-word counter
pub const TELEMETRY_REPORT_ID: u8 = 0xFF;

/// Width of the telemetry response in bytes
pub const TELEMETRY_LEN: usize = 4;

/// Errors from report encoding and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Write payload shorter than one burst or not whole words
    InvalidLength(usize),
    /// Response buffer cannot hold the encoded value
    BufferTooSmall,
}

/// What a host read request is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    /// Cumulative transmitted-word count
    Telemetry,
    /// Any identifier the device does not serve
    Unknown(u8),
}

impl ReportKind {
    /// Classify a report identifier
    pub fn from_id(id: u8) -> Self {
        match id {
            TELEMETRY_REPORT_ID => ReportKind::Telemetry,
            other => ReportKind::Unknown(other),
        }
    }
}

/// Check a write payload length
///
/// Accepts lengths of at least [`MIN_WRITE_LEN`] that are a whole number
/// of words. Returns the number of words on success.
pub fn validate_write_len(len: usize) -> Result<usize, ReportError> {
    if len < MIN_WRITE_LEN || len % WORD_LEN != 0 {
        return Err(ReportError::InvalidLength(len));
    }
    Ok(len / WORD_LEN)
}

/// Encode the transmitted-word count, least-significant byte first
///
/// Returns the number of bytes written.
pub fn encode_telemetry(words: u32, buffer: &mut [u8]) -> Result<usize, ReportError> {
    if buffer.len() < TELEMETRY_LEN {
        return Err(ReportError::BufferTooSmall);
    }
    buffer[..TELEMETRY_LEN].copy_from_slice(&words.to_le_bytes());
    Ok(TELEMETRY_LEN)
}
