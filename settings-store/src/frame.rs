use crate::crc::crc16;
use crate::settings::{Settings, SETTINGS_LEN};

/// Magic marking the start of a live frame. `'O' 'P' 'N' 'X'` read
/// little-endian on the wire.
pub const MAGIC: u32 = 0x584E_504F;

/// Bytes before the payload: magic(4) + length(2) + counter(2).
pub const HEADER_LEN: usize = 8;

/// Total on-disk size of a current, full-length frame: header + payload +
/// trailing CRC(2).
pub const FRAME_LEN: usize = HEADER_LEN + SETTINGS_LEN + 2;

/// Smallest frame that could possibly be valid: header + CRC, zero-length
/// payload.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + 2;

/// Encode a full-length frame (the shape every `save` writes; shorter
/// "stale" frames are only ever produced by older firmware, never by this
/// implementation).
pub fn encode_frame(out: &mut [u8; FRAME_LEN], counter: u16, settings: &Settings) {
    out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    out[4..6].copy_from_slice(&(FRAME_LEN as u16).to_le_bytes());
    out[6..8].copy_from_slice(&counter.to_le_bytes());
    let mut payload = [0u8; SETTINGS_LEN];
    settings.encode(&mut payload);
    out[8..8 + SETTINGS_LEN].copy_from_slice(&payload);
    let crc = crc16(&out[0..FRAME_LEN - 2]);
    out[FRAME_LEN - 2..FRAME_LEN].copy_from_slice(&crc.to_le_bytes());
}
