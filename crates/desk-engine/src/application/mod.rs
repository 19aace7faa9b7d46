//! Application layer

pub mod commands;
pub mod dto;

pub use commands::{HelpdeskEngine, Ports};
