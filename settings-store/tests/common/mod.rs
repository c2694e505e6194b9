use core::cell::RefCell;

use nvm::backends::MockNvm;
use nvm::{AreaDescriptor, Device};

pub const WRITE_SIZE: u32 = 4;
pub const ERASE_SIZE: u32 = 64;
/// Large enough to hold a handful of frames per partition half before a
/// partition fills up and needs an erase-and-rewrite cycle.
pub const DEV_SIZE: usize = 1024;
pub const HALF: u32 = (DEV_SIZE as u32) / 2;

pub fn device() -> RefCell<Device<MockNvm<DEV_SIZE>>> {
    RefCell::new(Device::new(
        "settings-flash",
        MockNvm::<DEV_SIZE>::new(WRITE_SIZE, ERASE_SIZE),
        WRITE_SIZE,
        ERASE_SIZE,
        DEV_SIZE as u32,
    ))
}

/// Both halves of a device as the A/B areas a settings store is built on.
pub fn areas(dev: &RefCell<Device<MockNvm<DEV_SIZE>>>) -> (AreaDescriptor<'_>, AreaDescriptor<'_>) {
    let area_a = AreaDescriptor::new("settings-a", dev, 0, HALF).unwrap();
    let area_b = AreaDescriptor::new("settings-b", dev, HALF, HALF).unwrap();
    (area_a, area_b)
}

/// Copy of every raw byte currently on the simulated device, used to diff
/// before/after a save and synthesize a torn write at an arbitrary byte
/// offset within that diff.
pub fn snapshot(dev: &RefCell<Device<MockNvm<DEV_SIZE>>>) -> Vec<u8> {
    dev.borrow().backend().raw().to_vec()
}

/// Overwrite the raw device contents, bypassing the bit-clear-only write
/// rule entirely: used only to synthesize a partially-completed write for
/// power-loss tests, not to model anything a real backend would do.
pub fn restore(dev: &RefCell<Device<MockNvm<DEV_SIZE>>>, bytes: &[u8]) {
    dev.borrow_mut().backend_mut().raw_mut().copy_from_slice(bytes);
}
