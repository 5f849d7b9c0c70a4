use std::path::PathBuf;
use std::{io, result};

pub fn setup_logging(verbosity_level: u32) -> anyhow::Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::BrightWhite)
        .trace(Color::Cyan);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let prefix = format!(
                "[{}][{}]\x1b[{}m ",
                record.target(),
                record.level(),
                colors.get_color(&record.level()).to_fg_str()
            );
            const SUFFIX: &str = "\x1b[0m";

            let s = format!("{}", message);
            let mut buf = String::with_capacity(s.len() + prefix.len() + SUFFIX.len());
            for (i, line) in s.split('\n').enumerate() {
                if i != 0 {
                    buf.push('\n');
                }
                buf += &prefix;
                buf += line;
                buf += SUFFIX;
            }

            out.finish(format_args!("{}", buf))
        })
        .level(match verbosity_level {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        // stdout carries the command output
        .chain(io::stderr())
        .apply()?;

    Ok(())
}

pub fn parse_sector_size(x: &str) -> result::Result<u32, String> {
    let x = u32::from_str_radix(x, 10).map_err(|e| e.to_string())?;
    if !x.is_power_of_two() {
        return Err("sector size not power of 2".to_owned());
    }
    if x < 512 {
        return Err("sector size must be at least 512".to_owned());
    }

    Ok(x)
}

/// Parses `NAME=FILE`, the name may be given with or without parentheses.
pub fn parse_disk_mapping(x: &str) -> result::Result<(String, PathBuf), String> {
    let (name, path) = x
        .split_once('=')
        .ok_or_else(|| "expected NAME=FILE".to_owned())?;
    if name.is_empty() || path.is_empty() {
        return Err("expected NAME=FILE".to_owned());
    }

    Ok((name.to_owned(), PathBuf::from(path)))
}
