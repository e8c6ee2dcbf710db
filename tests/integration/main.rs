//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no broker or
//! real devices required.

mod actuator_tests;
mod coordinator_tests;
mod device_tests;
mod mock_hw;
