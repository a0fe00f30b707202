//! Core domain + application logic for the support relay bot.
//!
//! This crate is framework-agnostic. Telegram and the on-disk store live behind ports
//! (traits) so the routing rules can be tested with in-memory fakes.

pub mod bootstrap;
pub mod config;
pub mod desk;
pub mod destination;
pub mod domain;
pub mod errors;
pub mod locks;
pub mod logging;
pub mod messaging;
pub mod routing;
pub mod store;
pub mod texts;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
