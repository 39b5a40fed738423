// Core domain types for the prop-bet wizard: selections, roster filtering,
// the step machine, the parlay slip, wire payloads and configuration.

pub mod config;
pub mod parlay;
pub mod payload;
pub mod roster;
pub mod selection;
pub mod wizard;
