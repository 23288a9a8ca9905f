// src/lib.rs

//! Heroes client library
//!
//! A failure-safe data-access layer over the heroes REST collection and a
//! debounced type-ahead search pipeline built on it.

pub mod error;
pub mod models;
pub mod notify;
pub mod search;
pub mod services;
pub mod transport;
pub mod utils;
