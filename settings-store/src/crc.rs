use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/CCITT-FALSE: polynomial `0x1021`, init `0xFFFF`, no reflection,
/// no final xor. Matches the project's long-standing `crc_ccitt` helper;
/// verified against the standard check value for ASCII `"123456789"`
/// (`0x29B1`) in `tests/scenarios.rs`.
const CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

pub fn crc16(bytes: &[u8]) -> u16 {
    CCITT_FALSE.checksum(bytes)
}
