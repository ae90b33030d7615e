// Wire types shared by every catalog endpoint.
//
// Entity payloads travel as raw `serde_json::Value`; typed domain
// records live in `catalog-core`. Only envelopes, query parameters,
// and small fixed-shape responses are modelled here.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

// ── Resources ────────────────────────────────────────────────────────

/// A REST collection exposed by the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Resource {
    Categories,
    Providers,
    /// The full game store.
    StoreGames,
    /// Games curated into the manager list.
    ManagerGames,
    Tags,
}

impl Resource {
    /// Path segment(s) relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Providers => "providers",
            Self::StoreGames => "games",
            Self::ManagerGames => "manager/games",
            Self::Tags => "tags",
        }
    }
}

/// Shared dropdown lookup lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LookupList {
    Categories,
    Providers,
}

impl LookupList {
    pub fn path(self) -> &'static str {
        match self {
            Self::Categories => "lookups/categories",
            Self::Providers => "lookups/providers",
        }
    }
}

/// One `{id, name}` entry of a dropdown lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: i64,
    pub name: String,
}

// ── Envelopes ────────────────────────────────────────────────────────

/// One server-paginated page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(alias = "total")]
    pub total_count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Mutation endpoints sometimes wrap the canonical entity in `{ data }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Result of the "is this entity deletable" probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProbe {
    pub deletable: bool,
    #[serde(default)]
    pub linked_games: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Authentication ───────────────────────────────────────────────────

/// Successful sign-in payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

// ── List query ───────────────────────────────────────────────────────

/// Page, size, and filter parameters accepted by every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub tag_ids: Vec<i64>,
    pub visibility: Vec<u32>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search: None,
            category_id: None,
            provider_id: None,
            tag_ids: Vec::new(),
            visibility: Vec::new(),
            date_from: None,
            date_to: None,
        }
    }

    /// Flatten into query-string pairs. Unset filters are omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        if let Some(id) = self.category_id {
            params.push(("categoryId", id.to_string()));
        }
        if let Some(id) = self.provider_id {
            params.push(("providerId", id.to_string()));
        }
        if !self.tag_ids.is_empty() {
            params.push(("tagIds", join(&self.tag_ids)));
        }
        if !self.visibility.is_empty() {
            params.push(("visibility", join(&self.visibility)));
        }
        if let Some(from) = self.date_from {
            params.push(("dateFrom", from.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(to) = self.date_to {
            params.push(("dateTo", to.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        params
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
