// src/common/error.rs

// No cfg_attr dance needed, thiserror is always available
#[derive(Debug, thiserror::Error)]
pub enum CcnetError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")] // Format string requires Debug on E
    Io(E),

    /// Read attempts exhausted without assembling a complete frame.
    #[error("Read attempts exhausted without a complete frame")]
    Timeout,

    /// Frame header invalid (bad start code, address, or length field).
    #[error("Invalid frame header")]
    Framing,

    /// Received CRC does not match calculated CRC.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// Buffer or wire-length limit exceeded.
    #[error("Buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },

    /// Peripheral explicitly rejected the command.
    #[error("Peripheral rejected the command (NAK)")]
    Nack,

    /// Peripheral does not support the command.
    #[error("Peripheral reported an illegal command")]
    IllegalCommand,

    /// Poll returned a status byte not in the CCNET status table.
    #[error("Unrecognized status byte: {0:#04x}")]
    UnknownStatus(u8),

    /// Got a validly framed response, but not the kind expected here
    /// (e.g. an ACK-only reply to a command that returns data).
    #[error("Unexpected response received")]
    UnexpectedResponse,
}

// No manual Display impl needed - thiserror handles it.
// No manual std::error::Error impl needed - thiserror handles it when its 'std' feature is enabled.

// Allow mapping from the underlying transport error if From is implemented
impl<E: core::fmt::Debug> From<E> for CcnetError<E> {
    fn from(e: E) -> Self {
        CcnetError::Io(e)
    }
}

// Note: For the Io(E) variant's #[error("...")] message to work correctly even
// in no_std, the underlying error type `E` must implement `core::fmt::Debug`.
// If the `std` feature is enabled, `E` would ideally also implement
// `std::error::Error` for better error chaining, but `Debug` is the minimum
// requirement for the format string used here.
