// src/models/mod.rs

//! Domain models for the heroes client.

mod config;
mod hero;

// Re-export all public types
pub use config::{ApiConfig, Config, LoggingConfig, SearchConfig};
pub use hero::{Hero, HeroId, HeroRef, NewHero};
