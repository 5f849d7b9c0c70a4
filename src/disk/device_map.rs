use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use super::raw::RawDisk;
use super::{normalize_disk_name, Disk, DiskOpener, DEFAULT_BLOCK_SIZE};
use crate::{Error, Result};

/// Table mapping disk names to image files.
///
/// The text form has one mapping per line, a parenthesized disk name followed
/// by the image path:
///
/// ```text
/// # comment
/// (hd0)   /var/lib/images/disk.img
/// (hd1)   ./second.img
/// ```
#[derive(Debug, Clone)]
pub struct DeviceMap {
    disks: BTreeMap<String, PathBuf>,
    block_size: u32,
}

impl Default for DeviceMap {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl DeviceMap {
    pub fn new(block_size: u32) -> Self {
        Self {
            disks: BTreeMap::new(),
            block_size,
        }
    }

    pub fn load(path: &Path, block_size: u32) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut map = Self::new(block_size);
        map.parse(&text)?;
        Ok(map)
    }

    /// Adds the mappings found in `text`, later lines override earlier ones.
    pub fn parse(&mut self, text: &str) -> Result<()> {
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = |reason: &str| Error::InvalidDeviceMap {
                line: i + 1,
                reason: reason.to_owned(),
            };

            if !line.starts_with('(') {
                return Err(invalid("disk name must be enclosed in parentheses"));
            }
            let close = line.find(')').ok_or_else(|| invalid("missing ')'"))?;
            let name = &line[1..close];
            if name.is_empty() {
                return Err(invalid("empty disk name"));
            }
            let path = line[close + 1..].trim();
            if path.is_empty() {
                return Err(invalid("missing image path"));
            }

            self.insert(name, path);
        }

        Ok(())
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, name: &str, path: P) {
        let name = normalize_disk_name(name).to_owned();
        let path = path.into();
        debug!("mapping ({}) to {}", name, path.display());
        self.disks.insert(name, path);
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.disks
            .get(normalize_disk_name(name))
            .map(PathBuf::as_path)
    }
}

impl DiskOpener for DeviceMap {
    fn open_disk(&self, name: &str) -> Result<Box<dyn Disk>> {
        let path = self
            .get(name)
            .ok_or_else(|| Error::UnknownDisk(name.to_owned()))?;
        let file = OpenOptions::new().read(true).write(false).open(path)?;

        Ok(Box::new(RawDisk::open(file, self.block_size)?))
    }
}
