pub mod announce;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod host;
pub mod outcome;
pub mod ui;
pub mod workflow;

pub use error::{GitflowError, Result};
