//! Core types and definitions for the shuttle docking and FTL subsystem.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, configuration, errors,
//! and constants. It has no dependency on any runtime loop.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;

pub use shuttle_geometry as geometry;
