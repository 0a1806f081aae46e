//! Shuttle docking and FTL simulation.
//!
//! Owns the hecs ECS world, runs the docking, FTL, placement and flatten
//! systems at a fixed tick rate, and produces `ShuttleSnapshot`s for the
//! frontend.

pub mod bus;
pub mod emergency;
pub mod engine;
pub mod joints;
pub mod lookup;
pub mod maps;
pub mod portals;
pub mod services;
pub mod staging;
pub mod systems;
pub mod transit;
pub mod world_setup;

pub use shuttle_core as core;
pub use engine::{ShuttleSimulation, SimConfig};
pub use transit::{Transit, TravelRequest};

#[cfg(test)]
mod tests;
