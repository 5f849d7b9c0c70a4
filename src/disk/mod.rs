mod device_map;
mod handle;
pub mod raw;

pub use device_map::DeviceMap;
pub use handle::DiskHandle;

use crate::Result;
use std::io;

pub const DEFAULT_BLOCK_SIZE: u32 = 512;

pub trait Info {
    fn block_size(&self) -> u32;
    fn disk_size(&self) -> u64;
}

pub trait Disk: io::Read + io::Seek + Info {}

/// Resolves a disk name such as `hd0` to an opened disk.
pub trait DiskOpener {
    fn open_disk(&self, name: &str) -> Result<Box<dyn Disk>>;
}

/// Strips the parentheses around a disk name, `(hd0)` and `hd0` name the same disk.
pub fn normalize_disk_name(name: &str) -> &str {
    if name.len() >= 2 && name.starts_with('(') && name.ends_with(')') {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

#[cfg(test)]
#[test]
fn test_normalize_disk_name() {
    crate::tests_init();

    assert_eq!(normalize_disk_name("hd0"), "hd0");
    assert_eq!(normalize_disk_name("(hd0)"), "hd0");
    assert_eq!(normalize_disk_name("(hd0"), "(hd0");
    assert_eq!(normalize_disk_name("()"), "");
    assert_eq!(normalize_disk_name(")"), ")");
}
