use crate::error::NvmError;

/// Capability set a concrete NVM backend implements.
///
/// `read` is mandatory. `write`, `erase`, and `sync` are optional: a
/// backend that can't support one simply leaves the default implementation
/// in place, which reports [`NvmError::NotSupported`] without touching
/// hardware. This mirrors the device descriptor's optional operation hooks
/// (read mandatory, write/erase/sync optional).
pub trait NvmBackend {
    /// Read `buf.len()` bytes starting at device-absolute `address`.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError>;

    /// Write `buf` at device-absolute `address`. On real flash this can only
    /// clear bits (1->0); callers must ensure the target region is erased
    /// for the bits being set.
    fn write(&mut self, _address: u32, _buf: &[u8]) -> Result<(), NvmError> {
        Err(NvmError::NotSupported)
    }

    /// Erase `size` bytes starting at device-absolute `address`.
    fn erase(&mut self, _address: u32, _size: u32) -> Result<(), NvmError> {
        Err(NvmError::NotSupported)
    }

    /// Flush any deferred state so prior writes are durable.
    fn sync(&mut self) -> Result<(), NvmError> {
        Ok(())
    }
}

/// An immutable device descriptor wrapping a backend, enforcing the
/// `write_size`/`erase_size` alignment contract at the boundary before any
/// call reaches hardware.
///
/// Misaligned writes on some parts (STM32H7, for instance) silently
/// corrupt flash rather than erroring, so alignment is checked here instead
/// of trusting every backend to check it itself.
pub struct Device<B> {
    name: &'static str,
    backend: B,
    write_size: u32,
    erase_size: u32,
    size: u32,
}

impl<B: NvmBackend> Device<B> {
    /// `erase_size` of 0 means the device does not support erase at all.
    pub const fn new(
        name: &'static str,
        backend: B,
        write_size: u32,
        erase_size: u32,
        size: u32,
    ) -> Self {
        Self {
            name,
            backend,
            write_size,
            erase_size,
            size,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
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

    pub fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        self.backend.read(address, buf)
    }

    pub fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        if self.write_size == 0
            || address % self.write_size != 0
            || buf.len() as u32 % self.write_size != 0
        {
            return Err(NvmError::Invalid);
        }
        self.backend.write(address, buf)
    }

    pub fn erase(&mut self, address: u32, size: u32) -> Result<(), NvmError> {
        if self.erase_size == 0 {
            return Err(NvmError::NotSupported);
        }
        if address % self.erase_size != 0 || size % self.erase_size != 0 {
            return Err(NvmError::Invalid);
        }
        self.backend.erase(address, size)
    }

    pub fn sync(&mut self) -> Result<(), NvmError> {
        self.backend.sync()
    }

    /// Direct access to the underlying backend, bypassing alignment
    /// enforcement. Meant for test harnesses that need to inspect or
    /// mutate raw device contents (e.g. simulating a torn write) rather
    /// than for production call sites.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable counterpart of [`Device::backend`].
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Object-safe view of [`Device`], used by the access layer so an
/// [`crate::access::AreaDescriptor`] can reference a device without being
/// generic over its backend type.
pub trait NvmDeviceOps {
    fn size(&self) -> u32;
    fn write_size(&self) -> u32;
    fn erase_size(&self) -> u32;
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError>;
    fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError>;
    fn erase(&mut self, address: u32, size: u32) -> Result<(), NvmError>;
    fn sync(&mut self) -> Result<(), NvmError>;
}

impl<B: NvmBackend> NvmDeviceOps for Device<B> {
    fn size(&self) -> u32 {
        Device::size(self)
    }

    fn write_size(&self) -> u32 {
        Device::write_size(self)
    }

    fn erase_size(&self) -> u32 {
        Device::erase_size(self)
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        Device::read(self, address, buf)
    }

    fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        Device::write(self, address, buf)
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<(), NvmError> {
        Device::erase(self, address, size)
    }

    fn sync(&mut self) -> Result<(), NvmError> {
        Device::sync(self)
    }
}
