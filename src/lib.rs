//! Constrained-device agent library.
//!
//! Samples sensors, evaluates a threshold policy and drives actuators,
//! with every subsystem talking through the
//! [`DataMessageListener`](app::ports::DataMessageListener) contract.
//! The binary in `main.rs` only parses arguments and runs a [`DeviceApp`].

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod scheduler;
pub mod sensors;
pub mod system;

pub use app::{Coordinator, DeviceApp};
pub use config::DeviceConfig;
pub use error::{Error, Result};
