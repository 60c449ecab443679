pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod server;

pub use error::{Error, Result};
