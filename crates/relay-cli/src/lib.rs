//! Relay CLI: stdin publisher and stdout subscriber.

pub mod cli;
pub mod client;
