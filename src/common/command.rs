// src/common/command.rs

//! CCNET command definitions.
//!
//! Each command is a fixed command code plus an optional payload; framing
//! and checksumming live in [`crate::common::frame`].

/// Represents a CCNET host-to-validator command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Acknowledge (`0x00`) - Explicitly confirms the validator's last frame.
    Ack,

    /// Reset (`0x30`) - Returns the validator to its power-up state.
    Reset,

    /// Get Status (`0x31`) - Requests the enabled bill types and security setup.
    GetStatus,

    /// Set Security (`0x32`) - Uploads a security configuration; the payload
    /// layout is device-model specific and passed through untouched.
    SetSecurity { config: &'a [u8] },

    /// Poll (`0x33`) - Requests the current device status and optional sub-code.
    Poll,

    /// Identification (`0x37`) - Requests part number, serial number and asset data.
    Identification,

    /// Get Bill Table (`0x41`) - Requests the denomination table.
    GetBillTable,

    /// Negative acknowledge (`0xFF`) - Explicitly rejects the validator's last frame.
    Nack,
}

impl<'a> Command<'a> {
    /// The wire command code.
    pub fn code(&self) -> u8 {
        match self {
            Command::Ack => 0x00,
            Command::Reset => 0x30,
            Command::GetStatus => 0x31,
            Command::SetSecurity { .. } => 0x32,
            Command::Poll => 0x33,
            Command::Identification => 0x37,
            Command::GetBillTable => 0x41,
            Command::Nack => 0xFF,
        }
    }

    /// The command payload; empty for everything except Set Security.
    pub fn payload(&self) -> &'a [u8] {
        match self {
            Command::SetSecurity { config } => config,
            _ => &[],
        }
    }
}
