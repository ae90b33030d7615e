// ── Catalog domain entities ──
//
// Typed views of the server's entity payloads. Only the fields the
// console renders are modelled; everything else survives in the
// record's `full_data` snapshot.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use catalog_api::{LookupList, Resource};

use super::entity_id::EntityId;
use crate::error::CoreError;

/// An entity type that is cached by its own domain module.
pub trait CatalogEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// REST collection backing this domain.
    const RESOURCE: Resource;
    /// Lowercase singular label used in keys and messages.
    const LABEL: &'static str;
    /// Dropdown list this entity feeds, if any.
    const DROPDOWN: Option<LookupList> = None;
    /// Whether the server may refuse deletes because of references.
    const REFERENTIAL: bool = false;

    fn id(&self) -> Option<EntityId>;

    fn name(&self) -> &str;

    /// Local checks run before any network call.
    fn validate(&self) -> Result<(), CoreError> {
        require_name(Self::LABEL, self.name())
    }
}

/// A source-domain entity carrying a boolean membership flag for some
/// other domain (e.g. "this store game is in the manager").
pub trait Membership: CatalogEntity {
    /// Destination collection the flag refers to.
    const TARGET: Resource;
    /// Wire name of the flag inside `full_data`.
    const FLAG_FIELD: &'static str;

    fn is_member(&self) -> bool;

    fn set_member(&mut self, member: bool);
}

fn require_name(label: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation(format!("{label} name is required")));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

// ── Category ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_count: Option<u32>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: None,
            description: None,
            is_active: true,
            game_count: None,
        }
    }
}

impl CatalogEntity for Category {
    const RESOURCE: Resource = Resource::Categories;
    const LABEL: &'static str = "category";
    const DROPDOWN: Option<LookupList> = Some(LookupList::Categories);
    const REFERENTIAL: bool = true;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ── Provider ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_count: Option<u32>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            logo_url: None,
            website: None,
            is_active: true,
            game_count: None,
        }
    }
}

impl CatalogEntity for Provider {
    const RESOURCE: Resource = Resource::Providers;
    const LABEL: &'static str = "provider";
    const DROPDOWN: Option<LookupList> = Some(LookupList::Providers);
    const REFERENTIAL: bool = true;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ── Store game ──────────────────────────────────────────────────────

/// A game as listed in the full store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub visibility: Vec<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub in_manager: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogEntity for StoreGame {
    const RESOURCE: Resource = Resource::StoreGames;
    const LABEL: &'static str = "game";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Membership for StoreGame {
    const TARGET: Resource = Resource::ManagerGames;
    const FLAG_FIELD: &'static str = "inManager";

    fn is_member(&self) -> bool {
        self.in_manager
    }

    fn set_member(&mut self, member: bool) {
        self.in_manager = member;
    }
}

// ── Manager game ────────────────────────────────────────────────────

/// A game curated into the manager list. Names and image URLs are
/// denormalized by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub visibility: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl CatalogEntity for ManagerGame {
    const RESOURCE: Resource = Resource::ManagerGames;
    const LABEL: &'static str = "manager game";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ── Tag ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

impl CatalogEntity for Tag {
    const RESOURCE: Resource = Resource::Tags;
    const LABEL: &'static str = "tag";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_name(Self::LABEL, &self.name)?;
        if let Some(ref color) = self.color {
            let hex = color.strip_prefix('#').unwrap_or_default();
            let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err(CoreError::validation(format!(
                    "tag color must be a hex value like #1a2b3c, got '{color}'"
                )));
            }
        }
        Ok(())
    }
}
