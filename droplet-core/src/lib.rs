//! Core types and service wiring for the droplet water-quality reporter.

/// Static set of water-source zones readings are matched against.
pub mod catalog;
/// TOML configuration shared by the front ends.
pub mod config;
/// Great-circle distance and water-source proximity checks.
pub mod geo;
/// Domain models shared by all adapters.
pub mod model;
/// Traits describing the external collaborators.
pub mod ports;
/// Radius-bounded quality averages and score colouring.
pub mod quality;
/// High-level service facade used by clients.
pub mod service;

pub use catalog::*;
pub use config::*;
pub use geo::*;
pub use model::*;
pub use ports::*;
pub use quality::*;
pub use service::*;
