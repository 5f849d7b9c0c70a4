pub mod gpt;
pub mod mbr;

use std::fmt;
use std::str::FromStr;

use crate::disk::Disk;
use crate::{Error, Result};

pub const GPT_MAP_NAME: &str = "gpt";
pub const MSDOS_MAP_NAME: &str = "msdos";

pub trait Partition {
    fn start(&self) -> u64;
    fn end(&self) -> u64;
    fn size(&self) -> u64 {
        (self.end() + 1).saturating_sub(self.start())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PartitionMap {
    Gpt,
    Msdos,
}

impl PartitionMap {
    /// Probing order, a GPT disk also carries a (protective) MBR.
    pub const ALL: [PartitionMap; 2] = [PartitionMap::Gpt, PartitionMap::Msdos];

    pub fn name(self) -> &'static str {
        match self {
            Self::Gpt => GPT_MAP_NAME,
            Self::Msdos => MSDOS_MAP_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|x| x.name() == name)
    }

    fn probe(self, disk: &mut dyn Disk, index: u32) -> Result<Option<ProbedPartition>> {
        let mbr = mbr::Mbr::load(disk)?;

        match self {
            Self::Gpt => {
                if !mbr.is_protective() {
                    return Err(Error::GptMissing);
                }

                let gpt = gpt::Gpt::load(disk)?;
                Ok(gpt.get_partition(index).map(|x| {
                    debug!(
                        "gpt partition {}: {} {{{}}} attributes 0x{:016x} priority {}",
                        index + 1,
                        gpt::partition_type_name(&x.type_guid).unwrap_or("unknown type"),
                        x.type_guid,
                        x.attributes,
                        x.priority()
                    );
                    ProbedPartition {
                        map: self,
                        number: index,
                        start: x.start_lba,
                        end: x.end_lba,
                        gpt_attributes: x.attributes,
                    }
                }))
            }
            Self::Msdos => {
                if mbr.is_protective() {
                    return Err(Error::ProtectiveMbr);
                }

                Ok(mbr.get_partition(index).map(|x| ProbedPartition {
                    map: self,
                    number: index,
                    start: x.start(),
                    end: x.end(),
                    gpt_attributes: 0,
                }))
            }
        }
    }
}

impl fmt::Display for PartitionMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Partition specifier, an optional map name followed by a 1-based number,
/// e.g. `2`, `gpt2` or `msdos1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PartitionSpec {
    pub map: Option<String>,
    pub index: u32,
}

impl FromStr for PartitionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPartitionSpec(s.to_owned());

        let split = s
            .find(|x: char| !x.is_ascii_alphabetic())
            .unwrap_or_else(|| s.len());
        let (map, number) = s.split_at(split);
        if number.is_empty() || !number.bytes().all(|x| x.is_ascii_digit()) {
            return Err(invalid());
        }

        let number = u32::from_str(number).map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }

        Ok(Self {
            map: if map.is_empty() {
                None
            } else {
                Some(map.to_owned())
            },
            index: number - 1,
        })
    }
}

/// A partition located by [`probe`].
#[derive(Debug, Clone)]
pub struct ProbedPartition {
    map: PartitionMap,
    number: u32,
    start: u64,
    end: u64,
    gpt_attributes: u64,
}

impl ProbedPartition {
    pub fn partition_map_name(&self) -> &'static str {
        self.map.name()
    }

    /// 0-based partition number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// GPT attribute word, always 0 on other partition maps.
    pub fn gpt_attributes(&self) -> u64 {
        self.gpt_attributes
    }
}

impl Partition for ProbedPartition {
    fn start(&self) -> u64 {
        self.start
    }
    fn end(&self) -> u64 {
        self.end
    }
}

/// Finds the partition named by `spec` on `disk`.
///
/// Without a map prefix every known partition map is tried in turn and the
/// first one that both recognizes the disk and has the partition wins.
pub fn probe(disk: &mut dyn Disk, spec: &str) -> Result<ProbedPartition> {
    let spec = PartitionSpec::from_str(spec)?;

    let maps = match spec.map.as_deref() {
        Some(name) => vec![PartitionMap::from_name(name).ok_or(Error::NotSupported)?],
        None => PartitionMap::ALL.to_vec(),
    };

    for map in maps {
        match map.probe(disk, spec.index) {
            Ok(Some(p)) => return Ok(p),
            Ok(None) => debug!("{} partition map has no partition {}", map, spec.index + 1),
            Err(e) => debug!("{} partition map not found: {}", map, e),
        }
    }

    Err(Error::NotFound)
}
