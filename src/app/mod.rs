//! Application core: coordination logic and its lifecycle wrapper.
//!
//! The business rules live in [`coordinator`] and [`policy`].  All
//! interaction with transports and raw readings happens through the
//! **port traits** in [`ports`], keeping this layer testable without a
//! broker or real sensors.  [`device`] wires it all up from config.

pub mod coordinator;
pub mod device;
pub mod policy;
pub mod ports;

pub use coordinator::Coordinator;
pub use device::DeviceApp;
pub use policy::ThresholdPolicy;
