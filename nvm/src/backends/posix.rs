use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::device::NvmBackend;
use crate::error::NvmError;

/// Backend over a regular file, for running the settings store on a
/// workstation (integration tests, host-side simulation, or tooling that
/// inspects a flash image dumped from a device).
///
/// Unlike [`super::MockNvm`] this does not enforce the bit-clear-only write
/// rule - the file is just a byte array on disk - so it's meant for
/// functional testing, not for catching erase-discipline bugs.
pub struct PosixFileNvm {
    file: File,
    write_size: u32,
    erase_size: u32,
    size: u32,
}

impl PosixFileNvm {
    /// Open (creating if necessary) a file of exactly `size` bytes,
    /// initialized to `0xFF` the first time it's created.
    pub fn open(path: impl AsRef<Path>, write_size: u32, erase_size: u32, size: u32) -> Result<Self, NvmError> {
        let path = path.as_ref();
        let is_new = !path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|_| NvmError::Io)?;

        if is_new {
            file.set_len(size as u64).map_err(|_| NvmError::Io)?;
            let blank = vec![0xFFu8; size as usize];
            file.write_all(&blank).map_err(|_| NvmError::Io)?;
        }

        let len = file.metadata().map_err(|_| NvmError::Io)?.len();
        if len != size as u64 {
            return Err(NvmError::Invalid);
        }

        Ok(Self {
            file,
            write_size,
            erase_size,
            size,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn write_size(&self) -> u32 {
        self.write_size
    }

    pub fn erase_size(&self) -> u32 {
        self.erase_size
    }
}

impl NvmBackend for PosixFileNvm {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        self.file
            .seek(SeekFrom::Start(address as u64))
            .map_err(|_| NvmError::Io)?;
        self.file.read_exact(buf).map_err(|_| NvmError::Io)
    }

    fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        self.file
            .seek(SeekFrom::Start(address as u64))
            .map_err(|_| NvmError::Io)?;
        self.file.write_all(buf).map_err(|_| NvmError::Io)
    }

    // No erase hook: a plain file has no block-erase primitive, so this
    // backend leaves the default `NvmBackend::erase` in place and reports
    // `NotSupported`, exercising the settings store's manual 0xFF-fill
    // fallback on partition-full.

    fn sync(&mut self) -> Result<(), NvmError> {
        self.file.sync_data().map_err(|_| NvmError::Io)
    }
}
