//! Inbound adapters driving the engine.

pub mod http;
