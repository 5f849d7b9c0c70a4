use std::fmt;

pub const PRIORITY_SHIFT: u32 = 48;
pub const PRIORITY_MASK: u64 = 0xF;

/// Boot priority stored in bits 48..=51 of a GPT partition attribute word.
///
/// Redundant-boot schemes rank bootable partitions with it, 15 being the
/// most preferred and 0 meaning "do not boot". The value always fits in two
/// decimal digits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const MAX: Priority = Priority(PRIORITY_MASK as u8);

    #[inline]
    pub fn from_attributes(attributes: u64) -> Self {
        Self(((attributes >> PRIORITY_SHIFT) & PRIORITY_MASK) as u8)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
