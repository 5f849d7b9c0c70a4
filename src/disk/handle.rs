use std::ops::{Deref, DerefMut};

use super::{normalize_disk_name, Disk, DiskOpener};
use crate::Result;

/// An opened disk, closed when the handle goes out of scope.
pub struct DiskHandle {
    name: String,
    disk: Box<dyn Disk>,
}

impl DiskHandle {
    pub fn open(opener: &dyn DiskOpener, name: &str) -> Result<Self> {
        let name = normalize_disk_name(name);
        let disk = opener.open_disk(name)?;
        debug!(
            "opened disk {} ({} bytes, {} byte sectors)",
            name,
            disk.disk_size(),
            disk.block_size()
        );

        Ok(Self {
            name: name.to_owned(),
            disk,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Deref for DiskHandle {
    type Target = dyn Disk;

    fn deref(&self) -> &Self::Target {
        &*self.disk
    }
}

impl DerefMut for DiskHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.disk
    }
}

impl Drop for DiskHandle {
    fn drop(&mut self) {
        debug!("closing disk {}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::DiskHandle;
    use crate::testing::{GptImage, TestDisks};
    use crate::Error;

    #[test]
    fn test_open_release() {
        crate::tests_init();

        let disks = TestDisks::new().with("hd0", GptImage::new(2048).build());

        {
            let handle = DiskHandle::open(&disks, "(hd0)").unwrap();
            assert_eq!(handle.name(), "hd0");
            assert_eq!(handle.disk_size(), 2048 * 512);
            assert_eq!(disks.releases(), 0);
        }
        assert_eq!(disks.releases(), 1);

        assert!(matches!(
            DiskHandle::open(&disks, "hd1"),
            Err(Error::UnknownDisk(ref x)) if x == "hd1"
        ));
        assert_eq!(disks.opens(), 1);
        assert_eq!(disks.releases(), 1);
    }
}
