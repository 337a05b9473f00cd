// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod status;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::Command;

// From crc.rs
pub use crc::{calculate_crc16, decode_crc, encode_crc};

// From error.rs
pub use error::CcnetError;

// From frame.rs
pub use frame::{Frame, FrameBuf, FrameClass};

// From hal_traits.rs
pub use hal_traits::{CcnetSerial, CcnetTrace, NullTrace};

// From status.rs
pub use status::{FailureReason, PollResponse, RejectReason, Status, SubCode};

// From types.rs
pub use types::{Baud, ExchangeLimits, LineConfig, ResponseBytes};
