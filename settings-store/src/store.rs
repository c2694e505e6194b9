use nvm::Partition;

use crate::crc::crc16;
use crate::error::SettingsError;
use crate::frame::{encode_frame, FRAME_LEN, HEADER_LEN, MAGIC, MIN_FRAME_LEN};
use crate::settings::{Settings, SETTINGS_LEN};

const FREE_MAGIC: u32 = 0xFFFF_FFFF;

/// Upper bound on a backend's write granularity this store will pad for.
/// Comfortably covers every Cortex-M flash word width in practice (1, 4, 8,
/// 16, double-word ECC flash at 16 or 32); a backend reporting a wider
/// `write_size` than this is rejected rather than silently mis-padded.
const MAX_WRITE_SIZE: u32 = 32;
const MAX_PADDED_LEN: usize = next_multiple(FRAME_LEN as u32, MAX_WRITE_SIZE) as usize;

const fn next_multiple(len: u32, align: u32) -> u32 {
    (len + align - 1) / align * align
}

/// Physical stride between one frame's header and the next, rounded up from
/// `FRAME_LEN` to the partition's write granularity. Frames are logically
/// `FRAME_LEN` bytes (or less, for a stale short frame written by older
/// firmware); the trailing pad bytes between the end of the frame and the
/// next aligned write boundary are never interpreted, only skipped over.
fn aligned_stride(len: u32, write_size: u32) -> Result<u32, SettingsError> {
    if write_size <= 1 {
        return Ok(len);
    }
    if write_size > MAX_WRITE_SIZE {
        return Err(SettingsError::Nvm(nvm::NvmError::Invalid));
    }
    Ok(next_multiple(len, write_size))
}

/// Outcome of walking one partition's header chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanResult {
    /// No frame ever written here.
    Empty,
    /// The newest candidate frame starts at `header_offset`; the first
    /// free byte after it (where the next write should land) is
    /// `free_offset`.
    Found { header_offset: u32, free_offset: u32 },
    /// A header in the chain has neither a valid magic nor the erased
    /// pattern: the chain itself is malformed.
    Corrupt,
}

/// Walk a partition's frame chain looking for the last header before the
/// first free (`0xFFFFFFFF`) slot, without reading past `limit` bytes in.
///
/// `limit` lets [`find_latest_valid_store`] re-scan while pretending the
/// partition ends right before a frame it already found to be corrupt,
/// recovering the previous intact frame in one pass per backoff step.
fn parse_partition(partition: &Partition, limit: u32) -> Result<ScanResult, SettingsError> {
    let write_size = partition.write_size();
    let mut offset = 0u32;
    let mut prev: Option<(u32, u32)> = None;

    loop {
        if offset > limit {
            return Ok(ScanResult::Corrupt);
        }
        if offset == limit {
            return Ok(match prev {
                Some((h, stride)) => ScanResult::Found {
                    header_offset: h,
                    free_offset: h + stride,
                },
                None => ScanResult::Empty,
            });
        }

        let mut hdr = [0u8; 6];
        partition.read(offset, &mut hdr)?;
        let magic = u32::from_le_bytes([hdr[0], hdr[1], hdr[2], hdr[3]]);

        if magic == MAGIC {
            let length = u16::from_le_bytes([hdr[4], hdr[5]]);
            if (length as usize) < MIN_FRAME_LEN {
                return Ok(ScanResult::Corrupt);
            }
            let stride = aligned_stride(length as u32, write_size)?;
            prev = Some((offset, stride));
            offset = offset.checked_add(stride).ok_or(SettingsError::IllSequence)?;
        } else if magic == FREE_MAGIC {
            return Ok(match prev {
                Some((h, stride)) => ScanResult::Found {
                    header_offset: h,
                    free_offset: h + stride,
                },
                None => ScanResult::Empty,
            });
        } else {
            return Ok(ScanResult::Corrupt);
        }
    }
}

/// Integrity classification of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Integrity {
    Valid,
    Stale,
    Corrupt,
}

struct ReadFrame {
    status: Integrity,
    counter: u16,
    settings: Settings,
}

/// Read and integrity-check the frame at `offset`.
fn read_and_check(partition: &Partition, offset: u32) -> Result<ReadFrame, SettingsError> {
    let mut header = [0u8; HEADER_LEN];
    partition.read(offset, &mut header)?;
    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length = u16::from_le_bytes([header[4], header[5]]);
    let counter = u16::from_le_bytes([header[6], header[7]]);

    if magic != MAGIC {
        return Ok(ReadFrame {
            status: Integrity::Corrupt,
            counter: 0,
            settings: Settings::default(),
        });
    }
    if length as usize > FRAME_LEN {
        return Err(SettingsError::TooLarge);
    }
    if (length as usize) < MIN_FRAME_LEN {
        return Ok(ReadFrame {
            status: Integrity::Corrupt,
            counter: 0,
            settings: Settings::default(),
        });
    }

    let mut buf = [0u8; FRAME_LEN];
    buf[0..HEADER_LEN].copy_from_slice(&header);
    let rest_len = length as usize - HEADER_LEN;
    partition.read(offset + HEADER_LEN as u32, &mut buf[HEADER_LEN..HEADER_LEN + rest_len])?;

    let on_disk_crc = u16::from_le_bytes([buf[length as usize - 2], buf[length as usize - 1]]);
    let computed_crc = crc16(&buf[0..length as usize - 2]);
    if on_disk_crc != computed_crc {
        return Ok(ReadFrame {
            status: Integrity::Corrupt,
            counter: 0,
            settings: Settings::default(),
        });
    }

    if length as usize == FRAME_LEN {
        let mut payload = [0u8; SETTINGS_LEN];
        payload.copy_from_slice(&buf[HEADER_LEN..HEADER_LEN + SETTINGS_LEN]);
        Ok(ReadFrame {
            status: Integrity::Valid,
            counter,
            settings: Settings::decode(&payload),
        })
    } else {
        let payload_len = length as usize - MIN_FRAME_LEN;
        let settings = Settings::decode_partial(&buf[HEADER_LEN..HEADER_LEN + payload_len]);
        Ok(ReadFrame {
            status: Integrity::Stale,
            counter,
            settings,
        })
    }
}

/// Result of scanning a whole partition for its newest usable frame
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanStatus {
    Valid,
    Stale,
    Empty,
    Corrupt,
}

pub(crate) struct ScanOutcome {
    pub status: ScanStatus,
    pub counter: u16,
    pub settings: Settings,
    /// Offset to write the next frame at. Meaningless when `status` is
    /// `Empty` (use 0) but always populated for `Corrupt`, since a corrupt
    /// tail still leaves a known-good free offset behind the last valid
    /// frame found before backing off ran out of partition to search.
    pub free_offset: u32,
}

pub(crate) fn find_latest_valid_store(partition: &Partition) -> Result<ScanOutcome, SettingsError> {
    let mut scan_limit = partition.size();
    let mut free_offset_first_pass: Option<u32> = None;

    loop {
        if scan_limit == 0 {
            return Ok(ScanOutcome {
                status: ScanStatus::Corrupt,
                counter: 0,
                settings: Settings::default(),
                free_offset: free_offset_first_pass.unwrap_or(0),
            });
        }

        match parse_partition(partition, scan_limit)? {
            ScanResult::Empty => {
                return Ok(ScanOutcome {
                    status: ScanStatus::Empty,
                    counter: 0,
                    settings: Settings::default(),
                    free_offset: 0,
                })
            }
            ScanResult::Corrupt => {
                return Ok(ScanOutcome {
                    status: ScanStatus::Corrupt,
                    counter: 0,
                    settings: Settings::default(),
                    free_offset: free_offset_first_pass.unwrap_or(0),
                })
            }
            ScanResult::Found {
                header_offset,
                free_offset,
            } => {
                if free_offset_first_pass.is_none() {
                    free_offset_first_pass = Some(free_offset);
                }
                let read = read_and_check(partition, header_offset)?;
                match read.status {
                    Integrity::Valid => {
                        return Ok(ScanOutcome {
                            status: ScanStatus::Valid,
                            counter: read.counter,
                            settings: read.settings,
                            free_offset: free_offset_first_pass.unwrap(),
                        })
                    }
                    Integrity::Stale => {
                        return Ok(ScanOutcome {
                            status: ScanStatus::Stale,
                            counter: read.counter,
                            settings: read.settings,
                            free_offset: free_offset_first_pass.unwrap(),
                        })
                    }
                    Integrity::Corrupt => {
                        scan_limit = header_offset;
                        continue;
                    }
                }
            }
        }
    }
}

/// Write a frame into `partition` at `offset`, erasing first when
/// `force_erase` is set or the frame would overrun the partition.
///
/// Returns the offset the *next* frame should be written at.
pub(crate) fn write_store(
    partition: &Partition,
    frame: &[u8; FRAME_LEN],
    offset: u32,
    force_erase: bool,
) -> Result<u32, SettingsError> {
    let write_size = partition.write_size();
    let stride = aligned_stride(FRAME_LEN as u32, write_size)?;
    let overflow = offset
        .checked_add(stride)
        .map_or(true, |end| end > partition.size());
    let erase = force_erase || overflow;

    let write_offset = if erase {
        match partition.erase_all() {
            Ok(()) => 0,
            Err(nvm::NvmError::NotSupported) => {
                fill_erased(partition)?;
                0
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        offset
    };

    if stride as usize == FRAME_LEN {
        partition.write(write_offset, frame)?;
    } else {
        // Pad with 0xFF out to the write granularity; an erased cell is
        // already 0xFF, so this half of the write is a no-op on real flash.
        let mut padded = [0xFFu8; MAX_PADDED_LEN];
        padded[..FRAME_LEN].copy_from_slice(frame);
        partition.write(write_offset, &padded[..stride as usize])?;
    }
    Ok(write_offset + stride)
}

/// Manual 0xFF fill for backends that can't erase (e.g. the POSIX-file
/// emulation): write-size-aligned chunks across the whole partition.
///
/// Assumes `partition.size()` is itself a multiple of the write size, true
/// of every real backend since sector/partition sizes are chosen in units
/// of the underlying program granularity.
fn fill_erased(partition: &Partition) -> Result<(), SettingsError> {
    let size = partition.size();
    let write_size = partition.write_size().max(1).min(MAX_WRITE_SIZE);
    let chunk = [0xFFu8; MAX_WRITE_SIZE as usize];
    let mut off = 0u32;
    while off < size {
        partition.write(off, &chunk[..write_size as usize])?;
        off += write_size;
    }
    Ok(())
}

pub(crate) fn encode_current_frame(out: &mut [u8; FRAME_LEN], counter: u16, settings: &Settings) {
    encode_frame(out, counter, settings)
}
