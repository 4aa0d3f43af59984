// src/lib.rs

pub mod config;
pub mod error;
pub mod platforms;
pub mod tasks;

pub use error::Error;
