//! FTL transit timing.
//!
//! Implements the phase clock that drives a shuttle through
//! Starting → Travelling → Arriving → Cooldown, and the per-class transit
//! profiles that pick durations and docking preferences.

pub mod fsm;
pub mod profiles;

pub use shuttle_core as core;
