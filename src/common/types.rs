// src/common/types.rs

use arrayvec::ArrayVec;
use core::time::Duration;

use super::frame::MAX_FRAME_LEN;

/// Largest data payload a response can carry after header and checksum
/// stripping (255-byte frame minus 3 header bytes minus 2 CRC bytes).
pub const MAX_RESPONSE_PAYLOAD: usize = MAX_FRAME_LEN - 5;

/// Owned, fixed-capacity copy of a response payload.
pub type ResponseBytes = ArrayVec<u8, MAX_RESPONSE_PAYLOAD>;

/// Line speeds supported by CCNET bill validators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Baud {
    #[default]
    B9600,
    B19200,
}

impl Baud {
    pub fn bits_per_second(self) -> u32 {
        match self {
            Baud::B9600 => 9600,
            Baud::B19200 => 19200,
        }
    }
}

/// Default per-attempt read timeout used when opening a port.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Serial line configuration consumed by a port adapter.
///
/// The device path stays with the adapter; opening and configuring the
/// physical port is not protocol logic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineConfig {
    pub baud: Baud,
    /// Upper bound on a single blocking transport read.
    pub read_timeout: Duration,
}

impl Default for LineConfig {
    fn default() -> Self {
        LineConfig {
            baud: Baud::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Bounds on one exchange's response-accumulation loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExchangeLimits {
    /// Maximum transport reads per exchange before giving up on a silent
    /// or drip-feeding device.
    pub max_read_attempts: u32,
}

impl Default for ExchangeLimits {
    fn default() -> Self {
        ExchangeLimits {
            max_read_attempts: 1050,
        }
    }
}
