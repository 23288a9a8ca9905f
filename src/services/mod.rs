//! Service layer for the heroes client.
//!
//! This module contains:
//! - The hero data-access service (`HeroService`)
//! - The error recovery policy every service call runs through (`Recovery`)

mod heroes;
mod recovery;

pub use heroes::HeroService;
pub use recovery::Recovery;
