// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction for the half-duplex serial link to the bill validator.
///
/// Implementations own the physical port; opening and configuring it
/// (device path, baud rate, timeout knobs) happens before the driver is
/// constructed and is outside this crate.
pub trait CcnetSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Performs one blocking, timeout-bounded read of whatever bytes are
    /// currently available.
    ///
    /// Returns `Ok(n)` with `n` bytes copied into `buf`, or
    /// `Err(nb::Error::WouldBlock)` if the read timeout elapsed with no
    /// data. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Writes a complete frame in one call.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Observer for the raw frames a driver sends and receives.
///
/// Replaces hardwired console tracing: the driver calls this for every
/// outbound frame (implicit ACKs included) and every validated inbound
/// frame, so callers can wire protocol traces into their own logging.
pub trait CcnetTrace {
    /// A frame was written to the line, checksum included.
    fn frame_sent(&mut self, frame: &[u8]);

    /// A frame passed validation, checksum already stripped.
    fn frame_received(&mut self, frame: &[u8]);
}

/// Trace sink that discards everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullTrace;

impl CcnetTrace for NullTrace {
    fn frame_sent(&mut self, _frame: &[u8]) {}
    fn frame_received(&mut self, _frame: &[u8]) {}
}
