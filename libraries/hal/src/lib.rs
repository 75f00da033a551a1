#![cfg_attr(not(test), no_std)]
extern crate nalgebra;

mod bus;
mod imu;
mod motor;
mod time;
mod types;

pub use bus::*;
pub use imu::*;
pub use motor::*;
pub use time::*;
pub use types::*;
