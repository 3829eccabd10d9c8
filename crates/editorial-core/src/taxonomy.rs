//! Rubriks and divisions.
//!
//! Only what the core needs: records the store can answer existence
//! checks for.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::slugify;

/// A topical section articles and rubrik-scoped roles are bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubrik {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
}

impl Rubrik {
    /// Create a rubrik; the slug is the slugified name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            slug: slugify(&name),
            name,
        }
    }
}

/// An organizational grouping of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
}

impl Division {
    /// Create a division; the slug is the slugified name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            slug: slugify(&name),
            name,
        }
    }
}
