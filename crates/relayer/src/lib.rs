//! Relayer: one publisher, many subscribers, bounded history replay.

pub mod api;
pub mod config;
pub mod relay;
