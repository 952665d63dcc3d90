//! Geoone CLI - JSON in, JSON out front end for `geoone-core`.
//!
//! The `geoone` binary has three subcommands:
//! - plan: flight path and photo waypoints for a terrain polygon
//! - angles: interior-angle markers for a polygon
//! - split: cut parcels along a buffered river line

pub mod commands;
pub mod config;
pub mod io;

pub use config::Config;
