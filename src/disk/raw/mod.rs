use crate::disk::{Disk, Info};
use crate::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// Flat disk image, sector N lives at byte offset `N * block_size`.
pub struct RawDisk<B>
where
    B: Read + Seek,
{
    backend: B,
    block_size: u32,
    disk_size: u64,
}

impl<B> RawDisk<B>
where
    B: Read + Seek,
{
    pub fn open(mut backend: B, block_size: u32) -> Result<Self> {
        if block_size < 512 || !is_power_of_2!(block_size) {
            return Err(Error::NotSupported);
        }

        let disk_size = backend.seek(SeekFrom::End(0))?;
        backend.seek(SeekFrom::Start(0))?;

        if disk_size % block_size as u64 != 0 {
            warn!(
                "disk size {} is not a multiple of block size {}, trailing bytes are ignored",
                disk_size, block_size
            );
        }

        Ok(Self {
            backend,
            block_size,
            disk_size: disk_size - disk_size % block_size as u64,
        })
    }
}

impl<B> Read for RawDisk<B>
where
    B: Read + Seek,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.backend.read(buf)
    }
}

impl<B> Seek for RawDisk<B>
where
    B: Read + Seek,
{
    fn seek(&mut self, seek: SeekFrom) -> io::Result<u64> {
        self.backend.seek(seek)
    }
}

impl<B> Info for RawDisk<B>
where
    B: Read + Seek,
{
    fn disk_size(&self) -> u64 {
        self.disk_size
    }
    fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl<B> Disk for RawDisk<B> where B: Read + Seek {}
