extern crate byteorder;
extern crate uuid;
#[macro_use]
extern crate log;
extern crate crc;
extern crate uuid_macros;

#[macro_use]
pub(crate) mod utils;

pub mod cmd;
pub mod disk;
pub mod env;
mod error;
pub mod part;

pub use error::*;

#[cfg(test)]
extern crate better_panic;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
pub(crate) fn tests_init() {
    better_panic::install();
}
