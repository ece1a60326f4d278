#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod constraint;
mod error;
mod version;
mod versions;

pub use constraint::*;
pub use error::*;
pub use version::*;
pub use versions::*;
