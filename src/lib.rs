pub mod cli;
pub mod git;
pub mod model;
pub mod pipeline;
pub mod resolver;

mod api;
mod config;
mod flock;

pub use api::{Pinvendor, PinvendorBuilder};
