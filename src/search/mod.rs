//! Debounced, stale-safe type-ahead search.
//!
//! - `stages`: debounce, distinct-adjacent and generation tracking
//! - `pipeline`: the coordinator task tying the stages to a [`Searcher`]

pub mod pipeline;
pub mod stages;

use async_trait::async_trait;

use crate::models::Hero;
use crate::services::HeroService;

pub use pipeline::{SearchPipeline, SearchResults};

/// Anything the pipeline can dispatch a term to.
///
/// Implementations must not fail: a failed search resolves to an empty list.
#[async_trait]
pub trait Searcher: Send + Sync + 'static {
    async fn search(&self, term: &str) -> Vec<Hero>;
}

#[async_trait]
impl Searcher for HeroService {
    async fn search(&self, term: &str) -> Vec<Hero> {
        HeroService::search(self, term).await
    }
}
