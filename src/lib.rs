//! MEMS 2J ECU Simulator
//!
//! Impersonates a MEMS 2J engine ECU on a K-Line so diagnostic tool software
//! can be developed without a car. The simulator answers the fixed
//! initialisation handshake and ReadDataByLocalId sensor polls, with
//! optional simulated sensor values.

pub mod buffer;
pub mod config;
pub mod error;
pub mod handler;
pub mod hex;
pub mod overrides;
pub mod protocol;
pub mod transport;

mod integration_tests;

pub use buffer::InputBuffer;
pub use config::{Backend, SimulatorConfig, TransportOverrides, TransportSettings};
pub use error::{ConfigError, TransportError};
pub use handler::{CommandHandler, SessionStats};
pub use overrides::{parse_override_args, ResponseOverrides};
pub use transport::Transport;
