//! Slices battery-test instrument logs (cycler, HPPC, Bitrode discharge,
//! thermocouple) into the windows an equivalent-circuit-model fit needs.

pub mod config;
pub mod data;
pub mod report;
