//! Hero record types.

use serde::{Deserialize, Serialize};

/// Server-assigned hero identifier.
pub type HeroId = u64;

/// A hero record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hero {
    /// Unique identifier, assigned by the backend on creation
    pub id: HeroId,

    /// Display name
    pub name: String,
}

impl Hero {
    pub fn new(id: HeroId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Payload for creating a hero. Carries no id; the backend assigns one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewHero {
    pub name: String,
}

impl NewHero {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Either a bare id or a full record, as accepted by `remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroRef {
    Id(HeroId),
    Record(Hero),
}

impl HeroRef {
    /// Resolve to the id the request is made against.
    pub fn id(&self) -> HeroId {
        match self {
            HeroRef::Id(id) => *id,
            HeroRef::Record(hero) => hero.id,
        }
    }
}

impl From<HeroId> for HeroRef {
    fn from(id: HeroId) -> Self {
        HeroRef::Id(id)
    }
}

impl From<Hero> for HeroRef {
    fn from(hero: Hero) -> Self {
        HeroRef::Record(hero)
    }
}

impl From<&Hero> for HeroRef {
    fn from(hero: &Hero) -> Self {
        HeroRef::Record(hero.clone())
    }
}
