//! Attitude control core for a BNO055 equipped quadcopter.
//!
//! Sensor bring-up and Euler acquisition, fixed-point PID per axis, X-layout
//! mixing with a safety envelope, and the tick that runs them in order. No
//! heap, no panics; everything hardware facing goes through `embedded-hal`.

#![no_std]

#[macro_use]
mod logging;

pub mod ahrs;
pub mod arming;
pub mod chrono;
pub mod cmd;
pub mod communication;
pub mod config;
pub mod controllers;
pub mod error;
pub mod flight;
pub mod mixer;
pub mod retry;
pub mod spsc;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use logging::create as create_logger;
