#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "logging")]
pub mod logging;
pub mod types;
pub mod utils;
