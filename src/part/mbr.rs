use crate::disk::Disk;
use crate::part::Partition;
use crate::{Error, Result};
use std::convert::TryInto;
use std::io::{Cursor, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

pub const PROTECTIVE_TYPE: u8 = 0xEE;
const EXTENDED_TYPES: [u8; 3] = [0x05, 0x0F, 0x85];

pub struct MbrPartition {
    pub flags: u8,
    pub partition_type: u8,
    pub lba: u32,
    pub num_sectors: u32,
}

impl MbrPartition {
    pub fn decode(buf: &[u8; 16]) -> Self {
        let mut cursor = Cursor::new(buf);

        let flags = cursor.read_u8().unwrap();
        cursor.set_position(4);
        let partition_type = cursor.read_u8().unwrap();
        cursor.set_position(8);
        let lba = cursor.read_u32::<LittleEndian>().unwrap();
        let num_sectors = cursor.read_u32::<LittleEndian>().unwrap();

        debug_assert_eq!(cursor.position(), 16);

        Self {
            flags,
            partition_type,
            lba,
            num_sectors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.partition_type == 0 || self.num_sectors == 0
    }

    pub fn is_extended(&self) -> bool {
        EXTENDED_TYPES.contains(&self.partition_type)
    }
}

impl Partition for MbrPartition {
    fn start(&self) -> u64 {
        self.lba as u64
    }
    fn end(&self) -> u64 {
        self.lba as u64 + self.num_sectors as u64 - 1
    }
}

pub struct Mbr {
    /// All four primary slots, empty ones included.
    pub partitions: Vec<MbrPartition>,
}

impl Mbr {
    pub fn load(disk: &mut dyn Disk) -> Result<Self> {
        let mut buf = [0u8; 512];

        disk.seek(SeekFrom::Start(0))?;
        disk.read_exact(&mut buf)?;

        if buf[0x1FE] != 0x55 || buf[0x1FF] != 0xAA {
            return Err(Error::MbrMissing);
        }

        let mut partitions: Vec<MbrPartition> = Vec::with_capacity(4);
        for x in [0x01BE, 0x01CE, 0x01DE, 0x01EE].iter().copied() {
            let p = MbrPartition::decode(&buf[x..x + 0x10].try_into().unwrap());
            if p.partition_type != 0 {
                debug!(
                    "MBR entry {}: type 0x{:02X} flags 0x{:02X} lba {} sectors {}",
                    partitions.len(),
                    p.partition_type,
                    p.flags,
                    p.lba,
                    p.num_sectors
                );
            }
            partitions.push(p);
        }

        Ok(Self { partitions })
    }

    /// True when the MBR only guards a GPT disk against legacy tools.
    ///
    /// Only the type byte counts, sector counts of protective entries are
    /// often bogus.
    pub fn is_protective(&self) -> bool {
        self.partitions
            .iter()
            .any(|x| x.partition_type == PROTECTIVE_TYPE)
    }

    /// Primary partition in slot `index`, extended containers are not partitions.
    pub fn get_partition(&self, index: u32) -> Option<&MbrPartition> {
        self.partitions
            .get(index as usize)
            .filter(|x| !x.is_empty() && !x.is_extended())
    }
}
