// src/services/heroes.rs

//! Hero data-access service.
//!
//! Each operation is one transport call wrapped by [`Recovery`]: callers get a
//! real result or a fallback, never an error.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{Hero, HeroId, HeroRef, NewHero};
use crate::notify::NotificationSink;
use crate::services::Recovery;
use crate::transport::{ApiRequest, Transport};

const DEFAULT_COLLECTION: &str = "api/memheroes";

/// CRUD and search operations over the heroes collection.
#[derive(Clone)]
pub struct HeroService {
    transport: Arc<dyn Transport>,
    recovery: Recovery,
    collection: String,
}

impl HeroService {
    /// Create a service against the default `api/memheroes` collection.
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            transport,
            recovery: Recovery::new(sink, "HeroService"),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Use a different collection path.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into().trim_matches('/').to_string();
        self
    }

    fn item_path(&self, id: HeroId) -> String {
        format!("{}/{}", self.collection, id)
    }

    fn filter_path(&self) -> String {
        format!("{}/", self.collection)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self
            .transport
            .send(&request)
            .await?
            .ok_or_else(|| AppError::EmptyBody(request.to_string()))?;
        Ok(serde_json::from_value(body)?)
    }

    async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.transport.send(&request).await?;
        Ok(())
    }

    /// Fetch every hero. Falls back to an empty list.
    pub async fn list_all(&self) -> Vec<Hero> {
        let request = ApiRequest::get(&self.collection);
        self.recovery
            .wrap("get_heroes", Vec::new(), self.fetch(request), |_| {
                "fetched heroes".to_string()
            })
            .await
    }

    /// Fetch a hero by id. A missing hero is a backend failure and yields `None`.
    pub async fn get_by_id(&self, id: HeroId) -> Option<Hero> {
        let request = ApiRequest::get(self.item_path(id));
        let call = async { self.fetch::<Hero>(request).await.map(Some) };
        self.recovery
            .wrap(&format!("get_hero id={id}"), None, call, |_| {
                format!("fetched hero id={id}")
            })
            .await
    }

    /// Fetch a hero by id through the `?id=` filter.
    ///
    /// A missing hero is a successful lookup with no match rather than a
    /// failure, and is logged as such.
    pub async fn get_by_id_lenient(&self, id: HeroId) -> Option<Hero> {
        let request = ApiRequest::get(self.filter_path()).with_query("id", id);
        let call = async {
            let heroes: Vec<Hero> = self.fetch(request).await?;
            Ok::<_, AppError>(heroes.into_iter().next())
        };
        self.recovery
            .wrap(&format!("get_hero id={id}"), None, call, |hero| {
                let outcome = if hero.is_some() { "fetched" } else { "did not find" };
                format!("{outcome} hero id={id}")
            })
            .await
    }

    /// Find heroes whose name contains `term`.
    ///
    /// A blank term returns an empty list without touching the backend or the
    /// notification sink.
    pub async fn search(&self, term: &str) -> Vec<Hero> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let request = ApiRequest::get(self.filter_path()).with_query("name", term);
        self.recovery
            .wrap("search_heroes", Vec::new(), self.fetch(request), |heroes| {
                if heroes.is_empty() {
                    format!("no heroes matching \"{term}\"")
                } else {
                    format!("found heroes matching \"{term}\"")
                }
            })
            .await
    }

    /// Create a hero. Returns the stored record with its assigned id, or
    /// `None` if it was not created.
    pub async fn create(&self, hero: &NewHero) -> Option<Hero> {
        let call = async {
            let request = ApiRequest::post(&self.collection, serde_json::to_value(hero)?);
            self.fetch::<Hero>(request).await.map(Some)
        };
        self.recovery
            .wrap("add_hero", None, call, |created| {
                let id = created.as_ref().map(|h| h.id).unwrap_or_default();
                format!("added hero w/ id={id}")
            })
            .await
    }

    /// Replace the stored hero with the same id.
    pub async fn update(&self, hero: &Hero) {
        let call = async {
            let request = ApiRequest::put(&self.collection, serde_json::to_value(hero)?);
            self.execute(request).await
        };
        self.recovery
            .wrap("update_hero", (), call, |_| {
                format!("updated hero id={}", hero.id)
            })
            .await
    }

    /// Delete a hero given either its id or the record itself.
    pub async fn remove(&self, target: impl Into<HeroRef>) {
        let id = target.into().id();
        let request = ApiRequest::delete(self.item_path(id));
        self.recovery
            .wrap("delete_hero", (), self.execute(request), |_| {
                format!("deleted hero id={id}")
            })
            .await
    }
}
