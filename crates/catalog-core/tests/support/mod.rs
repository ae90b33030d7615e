// Scripted in-memory `CatalogApi` shared by the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};

use catalog_api::{
    CatalogApi, DeleteProbe, Error, ListQuery, LookupItem, LookupList, Page, Resource,
    SignInResponse,
};
use catalog_core::session::MemoryTier;
use catalog_core::{Catalog, StoreConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SignIn,
    SignOut,
    List,
    Create,
    Update,
    Delete,
    Probe,
    Membership,
    Lookups,
}

impl Op {
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::SignOut | Self::Create | Self::Update | Self::Delete | Self::Membership
        )
    }
}

#[derive(Default)]
struct FakeState {
    collections: HashMap<Resource, Vec<Value>>,
    lookups: HashMap<LookupList, Vec<LookupItem>>,
    probes: HashMap<i64, DeleteProbe>,
    failures: HashMap<Op, VecDeque<Error>>,
    list_delays: VecDeque<Duration>,
    lookup_delays: VecDeque<Duration>,
    calls: Vec<(Op, Option<Resource>)>,
    queries: Vec<ListQuery>,
    next_id: i64,
    token: Option<String>,
}

/// In-memory catalog server. Lists paginate the seeded collections and
/// report their full length as the total.
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                next_id: 1000,
                ..FakeState::default()
            }),
        })
    }

    pub fn seed(&self, resource: Resource, items: Vec<Value>) {
        self.state.lock().unwrap().collections.insert(resource, items);
    }

    pub fn collection(&self, resource: Resource) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_lookups(&self, list: LookupList, items: Vec<LookupItem>) {
        self.state.lock().unwrap().lookups.insert(list, items);
    }

    pub fn set_probe(&self, id: i64, probe: DeleteProbe) {
        self.state.lock().unwrap().probes.insert(id, probe);
    }

    /// Make the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: Op, err: Error) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Delay the next list call by `delay`.
    pub fn delay_next_list(&self, delay: Duration) {
        self.state.lock().unwrap().list_delays.push_back(delay);
    }

    /// Delay the next lookups call by `delay`.
    pub fn delay_next_lookups(&self, delay: Duration) {
        self.state.lock().unwrap().lookup_delays.push_back(delay);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(o, _)| *o == op)
            .count()
    }

    pub fn calls_to(&self, op: Op, resource: Resource) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(o, r)| *o == op && *r == Some(resource))
            .count()
    }

    pub fn mutating_calls(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(o, _)| o.is_mutating())
            .count()
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.state.lock().unwrap().queries.last().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    fn record(&self, op: Op, resource: Option<Resource>) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op, resource));
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn id_of(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

#[async_trait]
impl CatalogApi for FakeApi {
    fn set_token(&self, token: Option<SecretString>) {
        use secrecy::ExposeSecret;
        self.state.lock().unwrap().token = token.map(|t| t.expose_secret().to_owned());
    }

    fn has_token(&self) -> bool {
        self.state.lock().unwrap().token.is_some()
    }

    async fn sign_in(
        &self,
        username: &str,
        _password: &SecretString,
    ) -> Result<SignInResponse, Error> {
        self.record(Op::SignIn, None)?;
        Ok(SignInResponse {
            token: format!("token-for-{username}"),
            user: Some(json!({ "username": username })),
        })
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.record(Op::SignOut, None)
    }

    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Page<Value>, Error> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.queries.push(query.clone());
            state.list_delays.pop_front()
        };
        self.record(Op::List, Some(resource))?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let items: Vec<Value> = self
            .collection(resource)
            .into_iter()
            .filter(|item| match &query.search {
                Some(needle) => item["name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(&needle.to_lowercase())),
                None => true,
            })
            .collect();
        let total = items.len() as u64;
        let size = query.page_size as usize;
        let skip = (query.page.max(1) as usize - 1) * size;
        Ok(Page {
            items: items.into_iter().skip(skip).take(size).collect(),
            total_count: total,
        })
    }

    async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, Error> {
        self.record(Op::Create, Some(resource))?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut created = payload.clone();
        created["id"] = json!(state.next_id);
        created["createdBy"] = json!("server");
        state
            .collections
            .entry(resource)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update(&self, resource: Resource, id: i64, payload: &Value) -> Result<Value, Error> {
        self.record(Op::Update, Some(resource))?;
        let mut state = self.state.lock().unwrap();
        let items = state.collections.entry(resource).or_default();
        let Some(existing) = items.iter_mut().find(|v| id_of(v) == Some(id)) else {
            return Err(Error::NotFound {
                message: format!("{resource} {id}"),
            });
        };
        let mut canonical = payload.clone();
        canonical["id"] = json!(id);
        if let Some(name) = canonical["name"].as_str() {
            canonical["name"] = json!(name.trim());
        }
        *existing = canonical.clone();
        Ok(canonical)
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<(), Error> {
        self.record(Op::Delete, Some(resource))?;
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(resource)
            .or_default()
            .retain(|v| id_of(v) != Some(id));
        Ok(())
    }

    async fn probe_delete(&self, resource: Resource, id: i64) -> Result<DeleteProbe, Error> {
        self.record(Op::Probe, Some(resource))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .probes
            .get(&id)
            .cloned()
            .unwrap_or(DeleteProbe {
                deletable: true,
                linked_games: None,
                message: None,
            }))
    }

    async fn set_membership(&self, resource: Resource, id: i64, member: bool) -> Result<(), Error> {
        self.record(Op::Membership, Some(resource))?;
        let mut state = self.state.lock().unwrap();
        let name = {
            let games = state.collections.entry(Resource::StoreGames).or_default();
            let game = games.iter_mut().find(|v| id_of(v) == Some(id));
            game.map(|g| {
                g["inManager"] = json!(member);
                g["name"].clone()
            })
        };
        let manager = state.collections.entry(resource).or_default();
        manager.retain(|v| v["gameId"].as_i64() != Some(id));
        if member {
            manager.push(json!({ "id": 500 + id, "gameId": id, "name": name.unwrap_or(Value::Null) }));
        }
        Ok(())
    }

    async fn lookups(&self, list: LookupList) -> Result<Vec<LookupItem>, Error> {
        let delay = self.state.lock().unwrap().lookup_delays.pop_front();
        self.record(Op::Lookups, None)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .lookups
            .get(&list)
            .cloned()
            .unwrap_or_default())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn category(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name, "slug": name.to_lowercase(), "sortOrder": id })
}

pub fn game(id: i64, name: &str, in_manager: bool) -> Value {
    json!({ "id": id, "name": name, "inManager": in_manager, "providerId": 7 })
}

pub fn lookup(id: i64, name: &str) -> LookupItem {
    LookupItem {
        id,
        name: name.into(),
    }
}

pub fn config(page_size: u32) -> StoreConfig {
    StoreConfig {
        page_size,
        ..StoreConfig::default()
    }
}

/// A catalog over `api` with process-local credential storage.
pub fn catalog(api: &Arc<FakeApi>, page_size: u32) -> Catalog {
    let api: Arc<dyn CatalogApi> = Arc::clone(api) as Arc<dyn CatalogApi>;
    Catalog::new(api, config(page_size), Arc::new(MemoryTier::new()))
}
