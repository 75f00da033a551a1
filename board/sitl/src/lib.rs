//! Host-side simulation board for the balance vehicle.
//!
//! Simulates the inertial sensor at the register level so the whole stack,
//! driver included, runs unmodified against it.

pub mod board;
pub mod sim;

pub use board::SitlBoard;
pub use sim::{MotorState, Sim};
