use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use gptpriority::cmd::{gptpriority as query, Context};
use gptpriority::disk::{DeviceMap, DiskOpener};
use gptpriority::env::{EnvBlock, Environment};

mod utils;

#[derive(Parser)]
#[clap(
    name = "gptpriority",
    version,
    about = "Displays the priority of a GPT partition, and optionally stores it in an environment variable",
    after_help = "ARGS: DISKNAME PARTITIONNUM [VARNAME]\n\nE.g. gptpriority -d hd2=disk.img hd2 2 prioA"
)]
struct Options {
    #[clap(
        short = 'm',
        long = "device-map",
        help = "Device map file, one \"(hd0) /path/to/disk.img\" mapping per line"
    )]
    device_map: Option<PathBuf>,

    #[clap(
        short = 'd',
        long = "disk",
        value_name = "NAME=FILE",
        parse(try_from_str = utils::parse_disk_mapping),
        help = "Map a disk name to an image file"
    )]
    disks: Vec<(String, PathBuf)>,

    #[clap(
        short,
        long,
        default_value = "512",
        parse(try_from_str = utils::parse_sector_size),
        help = "Logical sector size of disk images"
    )]
    sector_size: u32,

    #[clap(
        short = 'e',
        long = "env-file",
        default_value = "grubenv",
        help = "Environment block receiving VARNAME"
    )]
    env_file: PathBuf,

    #[clap(short, long, parse(from_occurrences), help = "Increase log verbosity")]
    verbose: u32,

    args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let o = Options::parse();
    utils::setup_logging(o.verbose).context("failed to set up logging")?;

    let mut disks = match o.device_map.as_deref() {
        Some(path) => DeviceMap::load(path, o.sector_size)
            .with_context(|| format!("failed to load device map {}", path.display()))?,
        None => DeviceMap::new(o.sector_size),
    };
    for (name, path) in o.disks.iter() {
        disks.insert(name, path.as_path());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&disks, &o.env_file, &o.args, &mut out)
}

/// Runs the command, persisting exported variables to `env_file`.
///
/// Only store mode reads the environment block, and it is written back only
/// after the command succeeded and changed the environment.
fn execute(
    disks: &dyn DiskOpener,
    env_file: &Path,
    args: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut block = if args.len() == 3 && env_file.exists() {
        EnvBlock::load(env_file).with_context(|| {
            format!("failed to load environment block {}", env_file.display())
        })?
    } else {
        EnvBlock::new()
    };
    let mut env = Environment::from_block(&block);

    query::run(&mut Context::new(disks, &mut env, out), args)?;

    if env.is_modified() {
        env.write_exported(&mut block);
        block.save(env_file).with_context(|| {
            format!("failed to save environment block {}", env_file.display())
        })?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn tests_init() {
    better_panic::install();
}
