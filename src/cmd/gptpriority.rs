//! `gptpriority DISKNAME PARTITIONNUM [VARNAME]`
//!
//! Reads the boot priority of a GPT partition and prints it, or stores it in
//! an exported environment variable when `VARNAME` is given.

use super::Context;
use crate::disk::DiskHandle;
use crate::env;
use crate::part::gpt::Priority;
use crate::part::{self, Partition, GPT_MAP_NAME};
use crate::{Error, Result};

pub const USAGE: &str = "gptpriority DISKNAME PARTITIONNUM [VARNAME]";

pub fn run<S: AsRef<str>>(ctx: &mut Context, args: &[S]) -> Result<()> {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::Usage(USAGE));
    }

    let disk_name = args[0].as_ref();
    let partition = args[1].as_ref();
    let var_name: Option<&str> = args.get(2).map(|x| x.as_ref());

    if let Some(name) = var_name {
        if !env::is_valid_name(name) {
            return Err(Error::InvalidVariableName(name.to_owned()));
        }
    }

    let mut disk = DiskHandle::open(ctx.disks, disk_name).map_err(|e| {
        debug!("failed to open disk {}: {}", disk_name, e);
        Error::InvalidDisk(disk_name.to_owned())
    })?;

    let part = part::probe(&mut *disk, partition).map_err(|e| {
        debug!("failed to probe partition {} on {}: {}", partition, disk.name(), e);
        Error::InvalidPartition(partition.to_owned())
    })?;

    debug!(
        "{} partition {} found at LBA {}..={}",
        part.partition_map_name(),
        part.number() + 1,
        part.start(),
        part.end()
    );

    if part.partition_map_name() != GPT_MAP_NAME {
        return Err(Error::NotGpt(format!(
            "{} partition {} is on a {} partition map",
            disk.name(),
            partition,
            part.partition_map_name()
        )));
    }

    let priority = Priority::from_attributes(part.gpt_attributes());

    match var_name {
        Some(name) => {
            ctx.env.set(name, priority.to_string())?;
            ctx.env.export(name)?;
        }
        None => writeln!(ctx.out, "Priority is {}", priority)?,
    }

    Ok(())
}
