use crate::device::NvmBackend;
use crate::error::NvmError;

/// In-memory NOR flash simulator for host-side tests.
///
/// Models the two properties real NOR flash has and RAM doesn't: erased
/// cells read back as `0xFF`, and a write can only clear bits, never set
/// them. Forgetting to erase before overwriting the same region with a
/// value containing a set bit that wasn't previously set is caught here the
/// same way it would silently corrupt data on real hardware - by simply
/// ANDing the new bits in rather than overwriting.
pub struct MockNvm<const SIZE: usize> {
    cells: [u8; SIZE],
    write_size: u32,
    erase_size: u32,
}

impl<const SIZE: usize> MockNvm<SIZE> {
    pub fn new(write_size: u32, erase_size: u32) -> Self {
        Self {
            cells: [0xFF; SIZE],
            write_size,
            erase_size,
        }
    }

    pub fn write_size(&self) -> u32 {
        self.write_size
    }

    pub fn erase_size(&self) -> u32 {
        self.erase_size
    }

    pub fn size(&self) -> u32 {
        SIZE as u32
    }

    /// Back-door accessor for tests that need to inspect raw cell contents
    /// without going through the bounds-checked `read`.
    pub fn raw(&self) -> &[u8] {
        &self.cells
    }

    /// Back-door mutator for tests that want to pre-corrupt or pre-seed
    /// the simulated device, bypassing the write-can-only-clear-bits rule.
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }
}

impl<const SIZE: usize> NvmBackend for MockNvm<SIZE> {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), NvmError> {
        let start = address as usize;
        let end = start.checked_add(buf.len()).ok_or(NvmError::Invalid)?;
        let src = self.cells.get(start..end).ok_or(NvmError::Invalid)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, address: u32, buf: &[u8]) -> Result<(), NvmError> {
        let start = address as usize;
        let end = start.checked_add(buf.len()).ok_or(NvmError::Invalid)?;
        let dst = self.cells.get_mut(start..end).ok_or(NvmError::Invalid)?;
        for (cell, byte) in dst.iter_mut().zip(buf) {
            *cell &= *byte;
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<(), NvmError> {
        let start = address as usize;
        let end = start.checked_add(size as usize).ok_or(NvmError::Invalid)?;
        let dst = self.cells.get_mut(start..end).ok_or(NvmError::Invalid)?;
        dst.fill(0xFF);
        Ok(())
    }
}
