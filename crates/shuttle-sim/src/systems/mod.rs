//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only)
//! plus the session `Services`. Per-shuttle transit state lives in the
//! engine; everything else lives in components.

pub mod autodock;
pub mod console;
pub mod dock_search;
pub mod docking;
pub mod emergency;
pub mod flatten;
pub mod ftl;
pub mod knockdown;
pub mod movement;
pub mod proximity;
pub mod recently_docked;
pub mod snapshot;
pub mod status;
pub mod thrusters;
