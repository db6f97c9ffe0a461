//! careers-watch domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Change detection, report rendering and the watch cycle

pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
