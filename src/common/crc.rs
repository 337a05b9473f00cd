// src/common/crc.rs

use crc::{Algorithm, Crc};

/// Custom CRC algorithm matching the CCNET wire checksum (CRC-16/KERMIT).
/// Polynomial: 0x1021 (normal representation of 0x8408 reversed)
/// Initial Value: 0x0000
/// Input Reflected: true
/// Output Reflected: true
/// Final XOR: 0x0000
/// Check Value: 0x2189 (for "123456789") - standard for CRC-16/KERMIT
/// Residue: 0x0000
///
/// This reproduces, bit for bit, the validator firmware's shift loop
/// (XOR the byte into the low accumulator byte, then eight right shifts
/// each XORing 0x8408 when the low bit is set). Empty input yields 0.
pub const CCNET_CRC: Algorithm<u16> = Algorithm {
    poly: 0x1021,
    init: 0x0000,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0x2189,
    width: 16,
    residue: 0x0000,
};

// Create a Crc instance for the CCNET algorithm for reuse.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&CCNET_CRC);

/// Calculates the CCNET CRC-16 for the given data buffer.
///
/// The checksum covers every frame byte preceding the two trailing CRC
/// bytes: start code, peripheral address, length, command code, payload.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a 16-bit CRC value into two bytes (LSB first) for the wire.
pub fn encode_crc(crc_value: u16) -> [u8; 2] {
    crc_value.to_le_bytes()
}

/// Decodes the two trailing wire bytes (LSB first) into a 16-bit CRC value.
///
/// # Panics
///
/// Panics if `crc_bytes` does not have a length of exactly 2.
pub fn decode_crc(crc_bytes: &[u8]) -> u16 {
    assert_eq!(crc_bytes.len(), 2, "Wire CRC must be 2 bytes long");
    u16::from_le_bytes([crc_bytes[0], crc_bytes[1]])
}
