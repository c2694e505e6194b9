/// Encoded payload length of [`Settings`] on the wire, in bytes.
pub const SETTINGS_LEN: usize = 28;

/// The persisted device configuration record.
///
/// Encoded/decoded field-by-field in a fixed order rather than via
/// `#[repr(packed)]` transmutation, so a forward-compatible short read
/// (an older, shorter on-disk layout) can fill a byte-identical in-memory
/// record one field at a time instead of relying on undefined behavior
/// around references to unaligned packed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Station callsign, NUL-padded ASCII.
    pub callsign: [u8; 10],
    /// Destination/contact id, NUL-padded ASCII.
    pub dest_id: [u8; 8],
    pub display_brightness: u8,
    pub display_contrast: u8,
    pub display_timer_seconds: u8,
    pub gps_enabled: bool,
    pub utc_offset_quarter_hours: i8,
    pub vox_level: u8,
    pub mic_gain: u8,
    pub squelch_level: u8,
    pub radio_band_mask: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            callsign: [0; 10],
            dest_id: [0; 8],
            display_brightness: 128,
            display_contrast: 128,
            display_timer_seconds: 30,
            gps_enabled: false,
            utc_offset_quarter_hours: 0,
            vox_level: 0,
            mic_gain: 64,
            squelch_level: 16,
            radio_band_mask: 0xFFFF,
        }
    }
}

impl Settings {
    /// Encode into exactly [`SETTINGS_LEN`] bytes, little-endian.
    pub fn encode(&self, out: &mut [u8; SETTINGS_LEN]) {
        out[0..10].copy_from_slice(&self.callsign);
        out[10..18].copy_from_slice(&self.dest_id);
        out[18] = self.display_brightness;
        out[19] = self.display_contrast;
        out[20] = self.display_timer_seconds;
        out[21] = self.gps_enabled as u8;
        out[22] = self.utc_offset_quarter_hours as u8;
        out[23] = self.vox_level;
        out[24] = self.mic_gain;
        out[25] = self.squelch_level;
        out[26..28].copy_from_slice(&self.radio_band_mask.to_le_bytes());
    }

    /// Decode a full-length, on-disk byte buffer.
    pub fn decode(buf: &[u8; SETTINGS_LEN]) -> Self {
        let mut callsign = [0u8; 10];
        callsign.copy_from_slice(&buf[0..10]);
        let mut dest_id = [0u8; 8];
        dest_id.copy_from_slice(&buf[10..18]);

        Self {
            callsign,
            dest_id,
            display_brightness: buf[18],
            display_contrast: buf[19],
            display_timer_seconds: buf[20],
            gps_enabled: buf[21] != 0,
            utc_offset_quarter_hours: buf[22] as i8,
            vox_level: buf[23],
            mic_gain: buf[24],
            squelch_level: buf[25],
            radio_band_mask: u16::from_le_bytes([buf[26], buf[27]]),
        }
    }

    /// Decode a possibly-truncated on-disk payload (forward
    /// compatibility): fields beyond `on_disk.len()` keep their default
    /// value. `on_disk` must not be longer than [`SETTINGS_LEN`].
    pub fn decode_partial(on_disk: &[u8]) -> Self {
        debug_assert!(on_disk.len() <= SETTINGS_LEN);
        let mut full = [0u8; SETTINGS_LEN];
        Self::default().encode(&mut full);
        full[..on_disk.len()].copy_from_slice(on_disk);
        Self::decode(&full)
    }
}
