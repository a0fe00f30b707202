//! Transport-neutral messaging model: inbound updates, payloads, and the gateway port.

pub mod port;
pub mod types;
