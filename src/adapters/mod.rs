//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements              | Connects to                  |
//! |---------------|-------------------------|------------------------------|
//! | `sim`         | InputPort, SensorPort   | kinematic plant model        |
//! |               | ActuatorPort            | H-bridge drivers on sim pins |
//! | `log_sink`    | EventSink               | `log` facade                 |
//! | `console_log` | `log::Log`              | stderr (host binary)         |

pub mod console_log;
pub mod log_sink;
pub mod sim;
