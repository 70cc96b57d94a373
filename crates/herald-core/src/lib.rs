pub mod announce;
pub mod board;
pub mod config;
pub mod cycle;
pub mod diff;
pub mod error;
pub mod io;
pub mod oauth;
pub mod paths;
pub mod publish;
pub mod tracker;
pub mod types;

pub use error::{HeraldError, Result};
