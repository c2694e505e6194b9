use core::cell::RefCell;

use crate::device::NvmDeviceOps;
use crate::error::NvmError;

/// A named, bounds-checked region of a single device.
///
/// `device` is shared via `RefCell` rather than owned outright so that
/// several areas (for example the two halves of an A/B partition) can
/// reference the same underlying device without each needing exclusive
/// access.
pub struct AreaDescriptor<'a> {
    name: &'static str,
    device: &'a RefCell<dyn NvmDeviceOps + 'a>,
    offset: u32,
    size: u32,
}

impl<'a> AreaDescriptor<'a> {
    pub fn new(
        name: &'static str,
        device: &'a RefCell<dyn NvmDeviceOps + 'a>,
        offset: u32,
        size: u32,
    ) -> Result<Self, NvmError> {
        let dev_size = device.borrow().size();
        if size == 0 || offset.checked_add(size).map_or(true, |end| end > dev_size) {
            return Err(NvmError::Invalid);
        }
        Ok(Self {
            name,
            device,
            offset,
            size,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn bounds_check(&self, address: u32, len: u32) -> Result<u32, NvmError> {
        let end = address.checked_add(len).ok_or(NvmError::Invalid)?;
        if end > self.size {
            return Err(NvmError::Invalid);
        }
        self.offset.checked_add(address).ok_or(NvmError::Invalid)
    }

    /// Read `buf.len()` bytes starting at area-relative `address`.
    pub fn read(&self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        let abs = self.bounds_check(address, buf.len() as u32)?;
        self.device.borrow_mut().read(abs, buf)
    }

    /// Write `buf` at area-relative `address`.
    pub fn write(&self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        let abs = self.bounds_check(address, buf.len() as u32)?;
        self.device.borrow_mut().write(abs, buf)
    }

    /// Erase `size` bytes starting at area-relative `address`.
    pub fn erase(&self, address: u32, size: u32) -> Result<(), NvmError> {
        let abs = self.bounds_check(address, size)?;
        self.device.borrow_mut().erase(abs, size)
    }

    pub fn write_size(&self) -> u32 {
        self.device.borrow().write_size()
    }

    pub fn erase_size(&self) -> u32 {
        self.device.borrow().erase_size()
    }

    pub fn sync(&self) -> Result<(), NvmError> {
        self.device.borrow_mut().sync()
    }
}

/// A named table of areas, resolved by name at startup the way a board's
/// memory map is usually assembled from a handful of named regions (boot,
/// app, settings-a, settings-b, ...).
pub struct AreaTable<'a> {
    areas: &'a [AreaDescriptor<'a>],
}

impl<'a> AreaTable<'a> {
    pub fn new(areas: &'a [AreaDescriptor<'a>]) -> Self {
        Self { areas }
    }

    pub fn get(&self, name: &str) -> Option<&'a AreaDescriptor<'a>> {
        self.areas.iter().find(|a| a.name == name)
    }
}

/// One half ("slot") of an A/B settings-store partition: a plain sub-view
/// over an [`AreaDescriptor`]. The store layer is the only thing that knows
/// slots come in pairs; the access layer just hands out bounds-checked
/// byte ranges.
pub struct Partition<'a> {
    area: &'a AreaDescriptor<'a>,
}

impl<'a> Partition<'a> {
    pub fn new(area: &'a AreaDescriptor<'a>) -> Self {
        Self { area }
    }

    pub fn size(&self) -> u32 {
        self.area.size()
    }

    pub fn write_size(&self) -> u32 {
        self.area.write_size()
    }

    pub fn erase_size(&self) -> u32 {
        self.area.erase_size()
    }

    pub fn read(&self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        self.area.read(address, buf)
    }

    pub fn write(&self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        self.area.write(address, buf)
    }

    pub fn erase(&self, address: u32, size: u32) -> Result<(), NvmError> {
        self.area.erase(address, size)
    }

    /// Erase the whole partition, one erase block at a time starting from
    /// the front. Most NVM backends require erase to operate on whole,
    /// aligned blocks, so a partition's size must already be a multiple of
    /// `erase_size`.
    pub fn erase_all(&self) -> Result<(), NvmError> {
        let erase_size = self.erase_size();
        if erase_size == 0 {
            return Err(NvmError::NotSupported);
        }
        if self.size() % erase_size != 0 {
            return Err(NvmError::Invalid);
        }
        let mut offset = 0;
        while offset < self.size() {
            self.erase(offset, erase_size)?;
            offset += erase_size;
        }
        Ok(())
    }
}
