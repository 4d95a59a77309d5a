//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one layer of the robot
//! program against mock hardware or the simulator.  Everything runs on the
//! host with no real hardware required.

mod binding_tests;
mod mock_hw;
mod scheduler_tests;
mod service_tests;
