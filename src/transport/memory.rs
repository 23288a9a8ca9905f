//! In-process backend that emulates the heroes REST API.
//!
//! Mimics the in-memory web API used as a stand-in backend during front-end
//! development:
//!
//! | Request | Result |
//! |---|---|
//! | `GET {collection}` | every hero |
//! | `GET {collection}/?id=N` | 0..1 heroes with that id |
//! | `GET {collection}/?name=t` | heroes whose name contains `t`, ignoring case |
//! | `GET {collection}/N` | the hero, or 404 |
//! | `POST {collection}` | hero with the next free id (11 on an empty collection) |
//! | `PUT {collection}` | replace by id, or insert when absent; empty body |
//! | `DELETE {collection}/N` | remove when present; empty body |
//!
//! Every request is recorded so tests can inspect what was sent.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Hero, HeroId};
use crate::transport::{ApiRequest, Method, Transport};

/// First id handed out by an empty collection.
const FIRST_ID: HeroId = 11;

const DEFAULT_COLLECTION: &str = "api/memheroes";

#[derive(Debug, Default)]
struct State {
    heroes: Vec<Hero>,
    requests: Vec<ApiRequest>,
}

/// Body accepted by POST: the id is optional.
#[derive(Deserialize)]
struct PostBody {
    #[serde(default)]
    id: Option<HeroId>,
    name: String,
}

/// In-memory heroes backend.
#[derive(Debug)]
pub struct MemoryTransport {
    collection: String,
    latency: Duration,
    state: Mutex<State>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryTransport {
    /// Create a backend holding the given heroes.
    pub fn new(heroes: Vec<Hero>) -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            latency: Duration::ZERO,
            state: Mutex::new(State {
                heroes,
                requests: Vec::new(),
            }),
        }
    }

    /// Create a backend with the stock demo heroes.
    pub fn seeded() -> Self {
        Self::new(seed_heroes())
    }

    /// Serve a different collection path.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into().trim_matches('/').to_string();
        self
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current contents of the collection.
    pub fn heroes(&self) -> Vec<Hero> {
        self.state().heroes.clone()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Split a request path into the item id, if any.
    ///
    /// `Ok(None)` addresses the collection itself.
    fn route(&self, request: &ApiRequest) -> Result<Option<HeroId>> {
        let rest = request
            .path
            .strip_prefix(&self.collection)
            .ok_or_else(|| AppError::NotFound(request.target()))?;
        let rest = rest.trim_matches('/');
        if rest.is_empty() {
            return Ok(None);
        }
        rest.parse::<HeroId>()
            .map(Some)
            .map_err(|_| AppError::NotFound(request.target()))
    }

    fn handle(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let item = self.route(request)?;
        let mut state = self.state();

        match (request.method, item) {
            (Method::Get, None) => {
                let heroes = filter(&state.heroes, request)?;
                Ok(Some(serde_json::to_value(heroes)?))
            }
            (Method::Get, Some(id)) => {
                let hero = state
                    .heroes
                    .iter()
                    .find(|h| h.id == id)
                    .ok_or_else(|| AppError::NotFound(request.target()))?;
                Ok(Some(serde_json::to_value(hero)?))
            }
            (Method::Post, None) => {
                let body: PostBody = serde_json::from_value(body_of(request)?)?;
                let id = match body.id {
                    Some(id) if state.heroes.iter().any(|h| h.id == id) => {
                        return Err(AppError::Status {
                            status: 409,
                            url: request.target(),
                        });
                    }
                    Some(id) => id,
                    None => next_id(&state.heroes).ok_or_else(|| AppError::Status {
                        status: 507,
                        url: request.target(),
                    })?,
                };
                let hero = Hero::new(id, body.name);
                state.heroes.push(hero.clone());
                Ok(Some(serde_json::to_value(hero)?))
            }
            (Method::Put, None) => {
                let hero: Hero = serde_json::from_value(body_of(request)?)?;
                match state.heroes.iter_mut().find(|h| h.id == hero.id) {
                    Some(existing) => *existing = hero,
                    None => state.heroes.push(hero),
                }
                Ok(None)
            }
            (Method::Delete, Some(id)) => {
                state.heroes.retain(|h| h.id != id);
                Ok(None)
            }
            _ => Err(AppError::Status {
                status: 405,
                url: request.target(),
            }),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
        self.state().requests.push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.handle(request)
    }
}

fn body_of(request: &ApiRequest) -> Result<Value> {
    request
        .body
        .clone()
        .ok_or_else(|| AppError::Status {
            status: 400,
            url: request.target(),
        })
}

/// Max id plus one, so ids stay unique after deletions.
///
/// `None` once the collection already holds `HeroId::MAX`.
fn next_id(heroes: &[Hero]) -> Option<HeroId> {
    match heroes.iter().map(|h| h.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(FIRST_ID),
    }
}

fn filter(heroes: &[Hero], request: &ApiRequest) -> Result<Vec<Hero>> {
    let mut matched: Vec<Hero> = heroes.to_vec();

    if let Some(raw) = request.query_value("id") {
        let id = raw.parse::<HeroId>().ok();
        matched.retain(|h| Some(h.id) == id);
    }
    if let Some(term) = request.query_value("name") {
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .map_err(AppError::transport)?;
        matched.retain(|h| pattern.is_match(&h.name));
    }
    Ok(matched)
}

/// Stock heroes served by [`MemoryTransport::seeded`].
pub fn seed_heroes() -> Vec<Hero> {
    [
        (11, "Dr Nice"),
        (12, "Narco"),
        (13, "Bombasto"),
        (14, "Celeritas"),
        (15, "Magneta"),
        (16, "RubberMan"),
        (17, "Dynama"),
        (18, "Dr IQ"),
        (19, "Magma"),
        (20, "Tornado"),
    ]
    .into_iter()
    .map(|(id, name)| Hero::new(id, name))
    .collect()
}
