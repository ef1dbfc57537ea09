#[macro_use]
extern crate log;

mod vvlib;
pub use self::vvlib::*;
