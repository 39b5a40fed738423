// Orchestrator: the event loop between the TUI and the prediction gateway.

pub mod app;
pub mod protocol;
