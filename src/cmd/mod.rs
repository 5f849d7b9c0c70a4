pub mod gptpriority;

use std::io::Write;

use crate::disk::DiskOpener;
use crate::env::Environment;

/// What a shell command gets to work with.
pub struct Context<'a> {
    pub disks: &'a dyn DiskOpener,
    pub env: &'a mut Environment,
    pub out: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn new(
        disks: &'a dyn DiskOpener,
        env: &'a mut Environment,
        out: &'a mut dyn Write,
    ) -> Self {
        Self { disks, env, out }
    }
}
