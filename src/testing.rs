//! In-memory disk images for tests.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use byteorder::{LittleEndian, WriteBytesExt};
use crc::crc32;
use uuid::Uuid;
use uuid_macros::uuid;

use crate::disk::raw::RawDisk;
use crate::disk::{Disk, DiskOpener, Info};
use crate::{Error, Result};

pub fn linux_filesystem() -> Uuid {
    uuid!("0FC63DAF-8483-4772-8E79-3D69D8477DE4")
}

pub fn chromeos_kernel() -> Uuid {
    uuid!("FE3A2A5D-4F32-41A7-B725-ACCC3285A309")
}

struct Entry {
    index: u32,
    type_guid: Uuid,
    start_lba: u64,
    end_lba: u64,
    attributes: u64,
    name: String,
}

/// Builds a disk image with a protective MBR and a primary GPT.
pub struct GptImage {
    num_sectors: u64,
    block_size: u32,
    entries_num: u32,
    entry_size: u32,
    protective_mbr: bool,
    corrupt_checksums: bool,
    entries: Vec<Entry>,
}

impl GptImage {
    pub fn new(num_sectors: u64) -> Self {
        Self {
            num_sectors,
            block_size: 512,
            entries_num: 128,
            entry_size: 128,
            protective_mbr: true,
            corrupt_checksums: false,
            entries: Vec::new(),
        }
    }

    pub fn block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn entry_size(mut self, entry_size: u32) -> Self {
        self.entry_size = entry_size;
        self
    }

    pub fn without_protective_mbr(mut self) -> Self {
        self.protective_mbr = false;
        self
    }

    pub fn corrupt_checksums(mut self) -> Self {
        self.corrupt_checksums = true;
        self
    }

    /// Adds a partition in table slot `index` (0-based).
    pub fn partition(
        mut self,
        index: u32,
        type_guid: Uuid,
        start_lba: u64,
        end_lba: u64,
        attributes: u64,
        name: &str,
    ) -> Self {
        self.entries.push(Entry {
            index,
            type_guid,
            start_lba,
            end_lba,
            attributes,
            name: name.to_owned(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let bs = self.block_size as usize;
        let mut image = vec![0u8; self.num_sectors as usize * bs];

        if self.protective_mbr {
            let count = (self.num_sectors - 1).min(u32::MAX as u64) as u32;
            write_mbr(&mut image, &[(0xEE, 1, count)]);
        }

        let table_len = self.entries_num as usize * self.entry_size as usize;
        let table_sectors = round_up!(table_len, bs) / bs;
        let mut table = vec![0u8; table_len];
        for e in self.entries.iter() {
            let offset = e.index as usize * self.entry_size as usize;
            let mut cursor = Cursor::new(&mut table[offset..offset + self.entry_size as usize]);
            write_guid(&mut cursor, e.type_guid).unwrap();
            write_guid(&mut cursor, Uuid::new_v4()).unwrap();
            cursor.write_u64::<LittleEndian>(e.start_lba).unwrap();
            cursor.write_u64::<LittleEndian>(e.end_lba).unwrap();
            cursor.write_u64::<LittleEndian>(e.attributes).unwrap();
            for x in e.name.encode_utf16() {
                cursor.write_u16::<LittleEndian>(x).unwrap();
            }
        }
        let mut table_crc32 = crc32::checksum_ieee(&table);
        if self.corrupt_checksums {
            table_crc32 = !table_crc32;
        }
        image[2 * bs..2 * bs + table_len].copy_from_slice(&table);

        let mut header = Cursor::new(vec![0u8; 92]);
        header.write_u64::<LittleEndian>(0x5452415020494645).unwrap();
        header.write_u32::<LittleEndian>(0x00010000).unwrap();
        header.write_u32::<LittleEndian>(92).unwrap();
        header.write_u32::<LittleEndian>(0).unwrap();
        header.write_u32::<LittleEndian>(0).unwrap();
        header.write_u64::<LittleEndian>(1).unwrap();
        header.write_u64::<LittleEndian>(self.num_sectors - 1).unwrap();
        header
            .write_u64::<LittleEndian>(2 + table_sectors as u64)
            .unwrap();
        header
            .write_u64::<LittleEndian>(self.num_sectors - 2 - table_sectors as u64)
            .unwrap();
        write_guid(&mut header, Uuid::new_v4()).unwrap();
        header.write_u64::<LittleEndian>(2).unwrap();
        header.write_u32::<LittleEndian>(self.entries_num).unwrap();
        header.write_u32::<LittleEndian>(self.entry_size).unwrap();
        header.write_u32::<LittleEndian>(table_crc32).unwrap();

        let mut header = header.into_inner();
        let mut header_crc32 = crc32::checksum_ieee(&header);
        if self.corrupt_checksums {
            header_crc32 = !header_crc32;
        }
        header[16..20].copy_from_slice(&header_crc32.to_le_bytes());
        image[bs..bs + header.len()].copy_from_slice(&header);

        image
    }
}

/// Builds an MBR disk image, entries are `(type, first lba, sector count)`.
pub fn mbr_image(num_sectors: u64, entries: &[(u8, u32, u32)]) -> Vec<u8> {
    let mut image = vec![0u8; num_sectors as usize * 512];
    write_mbr(&mut image, entries);
    image
}

fn write_mbr(image: &mut [u8], entries: &[(u8, u32, u32)]) {
    assert!(entries.len() <= 4);

    for (i, &(partition_type, lba, num_sectors)) in entries.iter().enumerate() {
        let offset = 0x1BE + i * 16;
        let mut cursor = Cursor::new(&mut image[offset..offset + 16]);
        cursor.write_u8(0).unwrap();
        cursor.write_all(&[0x00, 0x02, 0x00]).unwrap();
        cursor.write_u8(partition_type).unwrap();
        cursor.write_all(&[0xFF, 0xFF, 0xFF]).unwrap();
        cursor.write_u32::<LittleEndian>(lba).unwrap();
        cursor.write_u32::<LittleEndian>(num_sectors).unwrap();
    }
    image[0x1FE] = 0x55;
    image[0x1FF] = 0xAA;
}

fn write_guid<W: Write>(writer: &mut W, guid: Uuid) -> io::Result<()> {
    let (p0, p1, p2, p3) = guid.as_fields();
    writer.write_u32::<LittleEndian>(p0)?;
    writer.write_u16::<LittleEndian>(p1)?;
    writer.write_u16::<LittleEndian>(p2)?;
    writer.write_all(&p3[..])
}

/// Disk opener over in-memory images that counts opened and released disks.
#[derive(Default)]
pub struct TestDisks {
    images: BTreeMap<String, (Vec<u8>, u32)>,
    opens: Rc<Cell<usize>>,
    releases: Rc<Cell<usize>>,
}

impl TestDisks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, image: Vec<u8>) -> Self {
        self.with_block_size(name, image, 512)
    }

    pub fn with_block_size(mut self, name: &str, image: Vec<u8>, block_size: u32) -> Self {
        self.images.insert(name.to_owned(), (image, block_size));
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }
}

impl DiskOpener for TestDisks {
    fn open_disk(&self, name: &str) -> Result<Box<dyn Disk>> {
        let (image, block_size) = self
            .images
            .get(name)
            .ok_or_else(|| Error::UnknownDisk(name.to_owned()))?;
        let inner = RawDisk::open(Cursor::new(image.clone()), *block_size)?;
        self.opens.set(self.opens.get() + 1);

        Ok(Box::new(TrackedDisk {
            inner,
            releases: self.releases.clone(),
        }))
    }
}

struct TrackedDisk {
    inner: RawDisk<Cursor<Vec<u8>>>,
    releases: Rc<Cell<usize>>,
}

impl Read for TrackedDisk {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedDisk {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Info for TrackedDisk {
    fn block_size(&self) -> u32 {
        self.inner.block_size()
    }
    fn disk_size(&self) -> u64 {
        self.inner.disk_size()
    }
}

impl Disk for TrackedDisk {}

impl Drop for TrackedDisk {
    fn drop(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}
