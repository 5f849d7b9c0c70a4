use std::{io, result};

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error("MBR is missing")]
    MbrMissing,
    #[error("MBR is a GPT protective MBR")]
    ProtectiveMbr,
    #[error("GPT is missing")]
    GptMissing,
    #[error("{0}")]
    InvalidGpt(String),
    #[error("invalid partition specifier {0:?}")]
    InvalidPartitionSpec(String),
    #[error("unknown disk {0:?}")]
    UnknownDisk(String),
    #[error("device map line {line}: {reason}")]
    InvalidDeviceMap { line: usize, reason: String },
    #[error("invalid environment block: {0}")]
    InvalidEnvBlock(String),
    #[error("not supported")]
    NotSupported,
    #[error("not found")]
    NotFound,

    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid variable name {0:?}")]
    InvalidVariableName(String),
    #[error("not a disk: {0}")]
    InvalidDisk(String),
    #[error("no such partition: {0}")]
    InvalidPartition(String),
    #[error("not a GPT partition: {0}")]
    NotGpt(String),
}
