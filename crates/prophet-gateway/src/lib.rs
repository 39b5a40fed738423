// Remote prediction service access.

pub mod client;

pub use client::{GatewayClient, GatewayError, PredictionService};
