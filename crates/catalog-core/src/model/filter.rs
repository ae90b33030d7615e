// ── Filter inputs and normalized snapshots ──
//
// Raw widget values go in, a cheap-to-compare `FilterSnapshot` comes out.
// Two inputs that mean the same query always normalize to equal snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use catalog_api::ListQuery;

/// Sentinel a select widget uses for "no filter".
const ALL_SENTINEL: &str = "all";

/// Raw, un-normalized filter field values as a UI holds them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub search: String,
    pub category: Option<String>,
    pub provider: Option<String>,
    pub tags: Vec<String>,
    pub visibility: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// A single field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    Search(String),
    Category(Option<String>),
    Provider(Option<String>),
    Tags(Vec<String>),
    Visibility(Vec<String>),
    DateRange(Option<(NaiveDate, NaiveDate)>),
    /// Clear every field.
    Reset,
}

impl FilterInput {
    pub fn apply(&mut self, edit: FilterEdit) {
        match edit {
            FilterEdit::Search(s) => self.search = s,
            FilterEdit::Category(c) => self.category = c,
            FilterEdit::Provider(p) => self.provider = p,
            FilterEdit::Tags(t) => self.tags = t,
            FilterEdit::Visibility(v) => self.visibility = v,
            FilterEdit::DateRange(r) => self.date_range = r,
            FilterEdit::Reset => *self = Self::default(),
        }
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        let (date_from, date_to) = match self.date_range {
            Some((a, b)) => {
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                (start_of_day(start), end_of_day(end))
            }
            None => (None, None),
        };

        FilterSnapshot {
            search: Some(self.search.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            category_id: normalize_select(self.category.as_deref()),
            provider_id: normalize_select(self.provider.as_deref()),
            tag_ids: signature(&self.tags),
            visibility: signature(&self.visibility),
            date_from,
            date_to,
        }
    }
}

/// Immutable, normalized view of the filter fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSnapshot {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub provider_id: Option<i64>,
    /// Sorted, de-duplicated.
    pub tag_ids: Vec<i64>,
    /// Sorted, de-duplicated.
    pub visibility: Vec<u32>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl FilterSnapshot {
    /// Names of the fields that differ between `self` and `other`.
    pub fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.search != other.search {
            changed.push("search");
        }
        if self.category_id != other.category_id {
            changed.push("category");
        }
        if self.provider_id != other.provider_id {
            changed.push("provider");
        }
        if self.tag_ids != other.tag_ids {
            changed.push("tags");
        }
        if self.visibility != other.visibility {
            changed.push("visibility");
        }
        if self.date_from != other.date_from || self.date_to != other.date_to {
            changed.push("date_range");
        }
        changed
    }

    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    /// Build the list query for `page` of size `page_size`.
    pub fn to_query(&self, page: u32, page_size: u32) -> ListQuery {
        ListQuery {
            page,
            page_size,
            search: self.search.clone(),
            category_id: self.category_id,
            provider_id: self.provider_id,
            tag_ids: self.tag_ids.clone(),
            visibility: self.visibility.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

// ── Normalization helpers ───────────────────────────────────────────

fn normalize_select(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
        return None;
    }
    value.parse().ok()
}

fn signature<T: std::str::FromStr + Ord>(raw: &[String]) -> Vec<T> {
    let mut values: Vec<T> = raw.iter().filter_map(|v| v.trim().parse().ok()).collect();
    values.sort_unstable();
    values.dedup();
    values
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(23, 59, 59, 999).map(|dt| dt.and_utc())
}
