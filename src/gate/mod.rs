// src/gate/mod.rs
//! Reveal gate: a fresh master password before any sealed field is exposed

pub mod request;
pub mod sink;
pub mod state;

pub use request::PendingRevealRequest;
pub use sink::{EditFields, MemorySink, RevealSink};
pub use state::{GateState, RequestOutcome, Resolution, RevealGate};
