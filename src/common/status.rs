// src/common/status.rs

//! Device status decoding for the Poll response.
//!
//! The first payload byte maps to [`Status`]; a second byte, when present,
//! refines a `Rejecting` or `GenericFailure` status via [`SubCode`].

use core::fmt::Debug;

use super::error::CcnetError;

/// Closed enumeration of the CCNET device states reported by Poll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    PowerUp = 0x10,
    PowerUpWithBillValidator = 0x11,
    PowerUpWithBillStacker = 0x12,
    Initialize = 0x13,
    Idling = 0x14,
    Accepting = 0x15,
    Stacking = 0x17,
    Returning = 0x18,
    UnitDisabled = 0x19,
    Holding = 0x1A,
    DeviceBusy = 0x1B,
    Rejecting = 0x1C,
    DropCassetteFull = 0x41,
    DropCassetteOutOfPosition = 0x42,
    ValidatorJammed = 0x43,
    DropCassetteJammed = 0x44,
    Cheated = 0x45,
    GenericFailure = 0x47,
    /// A bill is held in escrow pending an accept/return decision.
    EscrowPosition = 0x80,
    BillStacked = 0x81,
    BillReturned = 0x82,
}

impl Status {
    /// Tries to convert a raw status byte into a Status.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Status::PowerUp),
            0x11 => Some(Status::PowerUpWithBillValidator),
            0x12 => Some(Status::PowerUpWithBillStacker),
            0x13 => Some(Status::Initialize),
            0x14 => Some(Status::Idling),
            0x15 => Some(Status::Accepting),
            0x17 => Some(Status::Stacking),
            0x18 => Some(Status::Returning),
            0x19 => Some(Status::UnitDisabled),
            0x1A => Some(Status::Holding),
            0x1B => Some(Status::DeviceBusy),
            0x1C => Some(Status::Rejecting),
            0x41 => Some(Status::DropCassetteFull),
            0x42 => Some(Status::DropCassetteOutOfPosition),
            0x43 => Some(Status::ValidatorJammed),
            0x44 => Some(Status::DropCassetteJammed),
            0x45 => Some(Status::Cheated),
            0x47 => Some(Status::GenericFailure),
            0x80 => Some(Status::EscrowPosition),
            0x81 => Some(Status::BillStacked),
            0x82 => Some(Status::BillReturned),
            _ => None,
        }
    }

    /// The raw status byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Why a bill was rejected (sub-code of [`Status::Rejecting`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    DueToInsertion = 0x60,
    DueToMagnetic = 0x61,
    DueToRemainedBillInHead = 0x62,
    DueToMultiplying = 0x63,
    DueToConveying = 0x64,
    DueToIdentification = 0x65,
    DueToVerification = 0x66,
    DueToOptic = 0x67,
    DueToInhibit = 0x68,
    DueToCapacity = 0x69,
    DueToOperation = 0x6A,
    DueToLength = 0x6C,
}

impl RejectReason {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x60 => Some(RejectReason::DueToInsertion),
            0x61 => Some(RejectReason::DueToMagnetic),
            0x62 => Some(RejectReason::DueToRemainedBillInHead),
            0x63 => Some(RejectReason::DueToMultiplying),
            0x64 => Some(RejectReason::DueToConveying),
            0x65 => Some(RejectReason::DueToIdentification),
            0x66 => Some(RejectReason::DueToVerification),
            0x67 => Some(RejectReason::DueToOptic),
            0x68 => Some(RejectReason::DueToInhibit),
            0x69 => Some(RejectReason::DueToCapacity),
            0x6A => Some(RejectReason::DueToOperation),
            0x6C => Some(RejectReason::DueToLength),
            _ => None,
        }
    }
}

/// What failed (sub-code of [`Status::GenericFailure`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum FailureReason {
    StackMotorFailure = 0x50,
    TransportMotorSpeedFailure = 0x51,
    TransportMotorFailure = 0x52,
    AligningMotorFailure = 0x53,
    InitialCassetteStatusFailure = 0x54,
    OpticCanalFailure = 0x55,
    MagneticCanalFailure = 0x56,
    CapacitanceCanalFailure = 0x5F,
}

impl FailureReason {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x50 => Some(FailureReason::StackMotorFailure),
            0x51 => Some(FailureReason::TransportMotorSpeedFailure),
            0x52 => Some(FailureReason::TransportMotorFailure),
            0x53 => Some(FailureReason::AligningMotorFailure),
            0x54 => Some(FailureReason::InitialCassetteStatusFailure),
            0x55 => Some(FailureReason::OpticCanalFailure),
            0x56 => Some(FailureReason::MagneticCanalFailure),
            0x5F => Some(FailureReason::CapacitanceCanalFailure),
            _ => None,
        }
    }
}

/// Second Poll payload byte, decoded against the status family.
///
/// `Raw` keeps a byte the device sent but which is not in the reject or
/// failure tables for that family (or whose status carries no table at
/// all, e.g. the escrow bill-type index).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubCode {
    Reject(RejectReason),
    Failure(FailureReason),
    Raw(u8),
}

impl SubCode {
    fn decode(status: Status, byte: u8) -> Self {
        match status {
            Status::Rejecting => RejectReason::from_byte(byte)
                .map(SubCode::Reject)
                .unwrap_or(SubCode::Raw(byte)),
            Status::GenericFailure => FailureReason::from_byte(byte)
                .map(SubCode::Failure)
                .unwrap_or(SubCode::Raw(byte)),
            _ => SubCode::Raw(byte),
        }
    }
}

/// Decoded result of a Poll exchange.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PollResponse {
    pub status: Status,
    pub sub_code: Option<SubCode>,
}

impl PollResponse {
    /// Decodes a Poll data payload.
    ///
    /// The status byte is validated against the closed [`Status`] table;
    /// an unrecognized byte fails with `UnknownStatus` rather than being
    /// passed through. An empty payload (the validator answered with a
    /// bare ACK) is `UnexpectedResponse`.
    pub fn decode<E>(payload: &[u8]) -> Result<Self, CcnetError<E>>
    where
        E: Debug,
    {
        let first = *payload.first().ok_or(CcnetError::UnexpectedResponse)?;
        let status = Status::from_byte(first).ok_or(CcnetError::UnknownStatus(first))?;
        let sub_code = payload.get(1).map(|&b| SubCode::decode(status, b));
        Ok(PollResponse { status, sub_code })
    }
}
