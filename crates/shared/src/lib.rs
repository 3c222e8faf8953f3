//! Shared wire types and codec for the relayer and its clients.

pub mod codec;
mod models;

pub use codec::CodecError;
pub use models::ws_types;
pub use models::{Envelope, HistoryMessage, PostData};
