use embedded_storage::nor_flash::{NorFlash, NorFlashError, ReadNorFlash};

use crate::device::NvmBackend;
use crate::error::NvmError;

/// Adapts any `embedded-storage` [`NorFlash`] implementation (the HAL
/// crates for most Cortex-M NOR flash controllers implement this trait) to
/// the [`NvmBackend`] used by this crate.
///
/// `embedded-storage` already encodes the write/erase alignment and
/// bit-clear-only semantics this crate expects of NOR flash, so this
/// adapter is a thin error-mapping shim rather than a from-scratch driver.
pub struct EmbeddedStorageNvm<S> {
    storage: S,
}

impl<S> EmbeddedStorageNvm<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

fn map_err<E: NorFlashError>(e: E) -> NvmError {
    use embedded_storage::nor_flash::NorFlashErrorKind;
    match e.kind() {
        NorFlashErrorKind::NotAligned | NorFlashErrorKind::OutOfBounds => NvmError::Invalid,
        _ => NvmError::Io,
    }
}

impl<S: ReadNorFlash + NorFlash> NvmBackend for EmbeddedStorageNvm<S> {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        self.storage.read(address, buf).map_err(map_err)
    }

    fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        self.storage.write(address, buf).map_err(map_err)
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<(), NvmError> {
        self.storage
            .erase(address, address + size)
            .map_err(map_err)
    }
}
