mod partition_type;
mod priority;

pub use partition_type::*;
pub use priority::*;

use super::Partition;
use crate::disk::Disk;
use crate::utils::decode_utf16le;
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use crc::{crc32, Hasher32};
use std::io::{Cursor, Read, SeekFrom};
use uuid::Uuid;

const GPT_SIGNATURE: u64 = 0x5452415020494645;
const GPT_HEADER_SIZE: u32 = 0x5C;
const GPT_ENTRY_FIELDS_SIZE: usize = 0x38;
const GPT_MIN_ENTRY_SIZE: u32 = 128;
const GPT_MAX_TABLE_SIZE: u64 = 1024 * 1024;

/// Primary GUID partition table as found at LBA 1.
pub struct Gpt {
    pub partitions: Vec<Option<GptPartition>>,
    //
    pub revision: u32,
    pub current_lba: u64,
    pub alternate_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: Uuid,
    pub partition_table_start: u64,
    pub partition_table_entries_num: u32,
    pub partition_table_entry_size: u32,
}

impl Gpt {
    /// Reads the primary header and its partition entry array.
    ///
    /// Checksums are computed but a mismatch is only reported through
    /// `warn!`, structural damage that makes the table unreadable is an error.
    // TODO: fall back to the backup header at alternate_lba
    pub fn load(disk: &mut dyn Disk) -> Result<Self> {
        let sector_size = disk.block_size() as u64;

        let mut header = vec![0u8; sector_size as usize];
        disk.seek(SeekFrom::Start(sector_size))?;
        disk.read_exact(header.as_mut_slice())?;

        let mut reader = Cursor::new(header.as_slice());
        let signature = reader.read_u64::<LittleEndian>()?;
        if signature != GPT_SIGNATURE {
            return Err(Error::GptMissing);
        }

        let revision = reader.read_u32::<LittleEndian>()?;
        let header_size = reader.read_u32::<LittleEndian>()?;
        if header_size < GPT_HEADER_SIZE || header_size as u64 > sector_size {
            return Err(Error::InvalidGpt(format!(
                "header size ({}) is outside of {}..={}",
                header_size, GPT_HEADER_SIZE, sector_size
            )));
        }
        let header_crc32 = reader.read_u32::<LittleEndian>()?;
        let _reserved = reader.read_u32::<LittleEndian>()?;
        let current_lba = reader.read_u64::<LittleEndian>()?;
        let alternate_lba = reader.read_u64::<LittleEndian>()?;
        let first_usable_lba = reader.read_u64::<LittleEndian>()?;
        let last_usable_lba = reader.read_u64::<LittleEndian>()?;
        let disk_guid = read_guid(&mut reader)?;
        let partition_table_start = reader.read_u64::<LittleEndian>()?;
        let partition_table_entries_num = reader.read_u32::<LittleEndian>()?;
        let partition_table_entry_size = reader.read_u32::<LittleEndian>()?;
        let partition_table_crc32 = reader.read_u32::<LittleEndian>()?;
        debug_assert_eq!(reader.position(), GPT_HEADER_SIZE as u64);

        debug!("GPT Header dump:");
        debug!("Revision                       : 0x{:08x}", revision);
        debug!("Header Size                    : {}", header_size);
        debug!("Current LBA                    : {}", current_lba);
        debug!("Alternate LBA                  : {}", alternate_lba);
        debug!("First Usable LBA               : {}", first_usable_lba);
        debug!("Last Usable LBA                : {}", last_usable_lba);
        debug!("Disk GUID                      : {{{}}}", disk_guid);
        debug!("Partition Table Start          : {}", partition_table_start);
        debug!(
            "Partition Table Entries Count  : {}",
            partition_table_entries_num
        );
        debug!(
            "Partition Table Entry Size     : {}",
            partition_table_entry_size
        );

        if partition_table_entry_size < GPT_MIN_ENTRY_SIZE || partition_table_entry_size % 8 != 0
        {
            return Err(Error::InvalidGpt(format!(
                "invalid partition entry size {}",
                partition_table_entry_size
            )));
        }
        let table_size = partition_table_entries_num as u64 * partition_table_entry_size as u64;
        if table_size > GPT_MAX_TABLE_SIZE {
            return Err(Error::InvalidGpt(format!(
                "partition table too large ({} bytes)",
                table_size
            )));
        }
        let table_offset = partition_table_start
            .checked_mul(sector_size)
            .filter(|x| x.saturating_add(table_size) <= disk.disk_size())
            .ok_or_else(|| {
                Error::InvalidGpt(format!(
                    "partition table at LBA {} lies outside of the disk",
                    partition_table_start
                ))
            })?;

        let mut crc32 = crc32::Digest::new(crc32::IEEE);
        crc32.write(&header[..16]);
        crc32.write(&[0u8; 4]);
        crc32.write(&header[20..header_size as usize]);
        check_crc32("GPT header", crc32.sum32(), header_crc32);

        let mut table = vec![0u8; table_size as usize];
        disk.seek(SeekFrom::Start(table_offset))?;
        disk.read_exact(table.as_mut_slice())?;

        crc32.reset();
        crc32.write(table.as_slice());
        check_crc32("Partition Table", crc32.sum32(), partition_table_crc32);

        let partitions = table
            .chunks_exact(partition_table_entry_size as usize)
            .map(GptPartition::decode)
            .collect::<Result<Vec<_>>>()?;

        for (i, p) in partitions
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|x| (i, x)))
        {
            debug!(
                "{:>5} 0x{:016x} 0x{:016x} {{{}}} {{{}}} 0x{:016x} {}",
                i, p.start_lba, p.end_lba, p.type_guid, p.unique_guid, p.attributes, p.partition_name
            );
        }

        Ok(Self {
            partitions,
            revision,
            current_lba,
            alternate_lba,
            first_usable_lba,
            last_usable_lba,
            disk_guid,
            partition_table_start,
            partition_table_entries_num,
            partition_table_entry_size,
        })
    }

    /// Used entry in table slot `index` (0-based).
    pub fn get_partition(&self, index: u32) -> Option<&GptPartition> {
        self.partitions.get(index as usize).and_then(|x| x.as_ref())
    }
}

fn check_crc32(what: &str, computed: u32, stored: u32) {
    if computed != stored {
        warn!(
            "{} checksum mismatch 0x{:08x} (computed) != 0x{:08x}",
            what, computed, stored
        );
    }
}

pub struct GptPartition {
    pub type_guid: Uuid,
    pub unique_guid: Uuid,
    pub start_lba: u64,
    pub end_lba: u64,
    pub attributes: u64,
    pub partition_name: String,
}

impl GptPartition {
    /// Decodes one entry of the partition array, `None` for an unused slot.
    pub fn decode(buf: &[u8]) -> Result<Option<Self>> {
        let mut cursor = Cursor::new(buf);

        let type_guid = read_guid(&mut cursor)?;
        if type_guid.is_nil() {
            return Ok(None);
        }
        let unique_guid = read_guid(&mut cursor)?;
        let start_lba = cursor.read_u64::<LittleEndian>()?;
        let end_lba = cursor.read_u64::<LittleEndian>()?;
        let attributes = cursor.read_u64::<LittleEndian>()?;
        debug_assert_eq!(cursor.position(), GPT_ENTRY_FIELDS_SIZE as u64);

        Ok(Some(Self {
            type_guid,
            unique_guid,
            start_lba,
            end_lba,
            attributes,
            partition_name: decode_utf16le(&buf[GPT_ENTRY_FIELDS_SIZE..]),
        }))
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        Priority::from_attributes(self.attributes)
    }
}

impl Partition for GptPartition {
    fn start(&self) -> u64 {
        self.start_lba
    }
    fn end(&self) -> u64 {
        self.end_lba
    }
}

fn read_guid<T>(reader: &mut T) -> Result<Uuid>
where
    T: Read,
{
    let p0 = reader.read_u32::<LittleEndian>()?;
    let p1 = reader.read_u16::<LittleEndian>()?;
    let p2 = reader.read_u16::<LittleEndian>()?;
    let mut p3 = [0u8; 8];
    reader.read_exact(&mut p3)?;

    Uuid::from_fields(p0, p1, p2, &p3).map_err(|e| Error::InvalidGpt(e.to_string()))
}
